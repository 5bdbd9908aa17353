//! CLI binary for pdf2md-client.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ClientConfig`, drives one session, and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use pdf2md_client::{
    ClientConfig, Converter, DirectorySink, DownloadProgressCallback, ProgressCallback,
    SessionState,
};
use serde_json::json;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the image batch plus a log line
/// per image.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} images  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Downloading");

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl DownloadProgressCallback for CliProgressCallback {
    fn on_download_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_asset_start(&self, _index: usize, _total: usize, filename: &str) {
        self.bar.set_message(filename.to_string());
    }

    fn on_asset_complete(&self, index: usize, total: usize, filename: &str, bytes: usize) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            green("✓"),
            index,
            total,
            filename,
            dim(&pdf2md_client::format_file_size(bytes as u64)),
        ));
        self.bar.inc(1);
    }

    fn on_asset_error(&self, index: usize, total: usize, filename: &str, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            index,
            total,
            filename,
            red(error),
        ));
        self.bar.inc(1);
    }

    fn on_download_complete(&self, total: usize, success_count: usize) {
        self.bar.finish_and_clear();
        let failed = self.errors.load(Ordering::SeqCst);
        if failed == 0 {
            eprintln!("{} {} images saved", green("✔"), bold(&success_count.to_string()));
        } else {
            eprintln!(
                "{} {}/{} images saved  ({} failed)",
                if success_count == 0 { red("✘") } else { cyan("⚠") },
                bold(&success_count.to_string()),
                total,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Markdown only, saved as ./report.md
  pdf2md-client markdown report.pdf

  # Markdown plus every extracted image, side by side in ./out
  pdf2md-client -o out markdown report.pdf --package local

  # One archive built by the service: ./report_package.zip
  pdf2md-client markdown report.pdf --package archive

  # Cropped images archive / Word document
  pdf2md-client images report.pdf
  pdf2md-client word report.pdf

  # Is the service up?
  pdf2md-client --server http://10.0.0.5:5000 health

ENVIRONMENT VARIABLES:
  PDF2MD_SERVER          Conversion service URL (default http://localhost:5000)
  PDF2MD_OUTPUT_DIR      Where artifacts are saved (default .)
  RUST_LOG               Override log filter (e.g. pdf2md_client=debug)
"#;

/// Convert PDF files through a remote conversion service.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2md-client",
    version,
    about = "Convert PDF files to Markdown, images, Word, or archives via a conversion service",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Conversion service base URL.
    #[arg(long, global = true, env = "PDF2MD_SERVER", default_value = "http://localhost:5000")]
    server: String,

    /// Directory artifacts are saved into.
    #[arg(short, long, global = true, env = "PDF2MD_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Pause between image downloads, in milliseconds.
    #[arg(long, global = true, env = "PDF2MD_DOWNLOAD_DELAY_MS", default_value_t = 100)]
    download_delay_ms: u64,

    /// Pause before saving the Markdown of a local package, in milliseconds.
    #[arg(long, global = true, env = "PDF2MD_SETTLE_DELAY_MS", default_value_t = 500)]
    settle_delay_ms: u64,

    /// Per-request timeout in seconds (default: wait indefinitely).
    #[arg(long, global = true, env = "PDF2MD_TIMEOUT")]
    timeout: Option<u64>,

    /// Largest accepted PDF, in MiB.
    #[arg(long, global = true, env = "PDF2MD_MAX_SIZE_MB", default_value_t = 50)]
    max_size_mb: u64,

    /// Print a JSON report on stdout.
    #[arg(long, global = true, env = "PDF2MD_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, global = true, env = "PDF2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDF2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDF2MD_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert to Markdown with locally linked images.
    Markdown(MarkdownArgs),
    /// Download the cropped-images archive.
    Images {
        /// PDF file to convert.
        input: PathBuf,
    },
    /// Download a Word document.
    Word {
        /// PDF file to convert.
        input: PathBuf,
    },
    /// Check that the conversion service is running.
    Health,
}

#[derive(Args, Debug)]
struct MarkdownArgs {
    /// PDF file to convert.
    input: PathBuf,

    /// How to deliver the result.
    #[arg(long, value_enum, default_value = "none")]
    package: PackageArg,

    /// Also download every image (implied by `--package local`).
    #[arg(long)]
    images: bool,

    /// Copy the Markdown to the terminal clipboard.
    #[arg(long)]
    copy: bool,

    /// Write the Markdown to stdout as well.
    #[arg(long)]
    print: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum PackageArg {
    /// Markdown file only.
    None,
    /// Markdown file and images side by side.
    Local,
    /// Single archive built by the service.
    Archive,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as ProgressCallback)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;
    let mut converter = Converter::new(config, DirectorySink::new(&cli.output_dir))
        .context("Failed to create client")?;
    let mut session = SessionState::new();

    match cli.command {
        Command::Health => {
            let health = converter
                .health()
                .await
                .context("Health check failed")?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&health)?);
            } else if !cli.quiet {
                let mark = if health.is_ok() { green("✔") } else { red("✘") };
                eprintln!("{} {} {}", mark, bold(&health.status), health.message);
            }
        }

        Command::Images { ref input } | Command::Word { ref input } => {
            let word = matches!(cli.command, Command::Word { .. });
            converter
                .select_path(&mut session, input)
                .context("File rejected")?;
            let saved = if word {
                converter.to_word(&mut session).await
            } else {
                converter.to_cropped_images(&mut session).await
            }
            .context("Conversion failed")?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&saved)?);
            } else if !cli.quiet {
                eprintln!(
                    "{}  {}  →  {}",
                    green("✔"),
                    dim(&pdf2md_client::format_file_size(saved.bytes as u64)),
                    bold(&saved.path.display().to_string()),
                );
            }
        }

        Command::Markdown(ref args) => {
            run_markdown(&cli, args, &mut converter, &mut session).await?;
        }
    }

    Ok(())
}

async fn run_markdown(
    cli: &Cli,
    args: &MarkdownArgs,
    converter: &mut Converter<DirectorySink>,
    session: &mut SessionState,
) -> Result<()> {
    converter
        .select_path(session, &args.input)
        .context("File rejected")?;
    if !cli.quiet && !cli.json {
        if let Some(file) = session.selected() {
            eprintln!(
                "{} {} {}",
                cyan("◆"),
                bold(&format!("Converting {}", file.name)),
                dim(&format!("({})", file.display_size()))
            );
        }
    }

    let result = converter
        .to_markdown(session)
        .await
        .context("Conversion failed")?;

    let mut report = json!({
        "filename": result.filename,
        "image_count": result.image_count(),
        "images": result.images,
    });

    match args.package {
        PackageArg::None => {
            if args.images && result.image_count() > 0 {
                let summary = converter
                    .download_all_images(session)
                    .await
                    .context("Image download failed")?;
                report["downloads"] = serde_json::to_value(&summary)?;
            }
            let path = converter
                .save_markdown(session)
                .await
                .context("Failed to save Markdown")?;
            report["markdown_path"] = json!(path);
            if !cli.quiet && !cli.json {
                eprintln!("{}  {}", green("✔"), bold(&path.display().to_string()));
            }
        }
        PackageArg::Local => {
            let composite = converter
                .save_local_composite(session)
                .await
                .context("Failed to save package")?;
            if !cli.quiet && !cli.json {
                let complete = composite.images.as_ref().is_none_or(|s| s.is_complete());
                eprintln!(
                    "{}  {}",
                    if complete { green("✔") } else { cyan("⚠") },
                    composite.message()
                );
            }
            report["package"] = serde_json::to_value(&composite)?;
        }
        PackageArg::Archive => {
            let archive = converter
                .save_server_archive(session)
                .await
                .context("Failed to download package")?;
            if !cli.quiet && !cli.json {
                eprintln!(
                    "{}  {}  {}",
                    green("✔"),
                    bold(&archive.path.display().to_string()),
                    dim(&format!(
                        "(Markdown + {} images, {})",
                        archive.image_count,
                        pdf2md_client::format_file_size(archive.bytes as u64)
                    )),
                );
            }
            report["package"] = serde_json::to_value(&archive)?;
        }
    }

    if args.copy {
        // A missing clipboard should not fail a conversion that already saved.
        match converter.copy_markdown(session).await {
            Ok(()) if !cli.quiet && !cli.json => eprintln!("{} Markdown copied", green("✔")),
            Ok(()) => {}
            Err(e) => eprintln!("{} {}", cyan("⚠"), e),
        }
    }

    if args.print {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(result.markdown.as_bytes())
            .context("Failed to write to stdout")?;
        if !result.markdown.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ClientConfig> {
    let mut builder = ClientConfig::builder()
        .base_url(cli.server.clone())
        .max_file_size(cli.max_size_mb.saturating_mul(1024 * 1024))
        .download_delay_ms(cli.download_delay_ms)
        .settle_delay_ms(cli.settle_delay_ms);

    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
