//! Package assembly: turn a conversion result into a deliverable.
//!
//! Two delivery modes:
//!
//! * **Local composite**: every image is downloaded next to a
//!   `<base>.md` file. Links produced by [`crate::pipeline::rewrite`] are
//!   bare filenames, so the images must stay in the same directory.
//! * **Server archive**: the service zips Markdown and images into one
//!   `<base>_package.zip`.

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::pipeline::download::{self, DownloadSummary};
use crate::pipeline::service::{PackageRequest, ServiceClient};
use crate::pipeline::sink::ArtifactSink;
use crate::session::SessionState;
use bytes::Bytes;
use serde::Serialize;
use std::path::PathBuf;
use tokio::time::{sleep, Duration};
use tracing::info;

/// Base name used when the source document name is unknown.
pub const FALLBACK_BASE_NAME: &str = "converted";

/// Shown with every composite that includes images.
pub const LINK_GUIDANCE: &str =
    "Keep the image files in the same directory as the Markdown file so the images display correctly.";

/// Source name without a trailing `.pdf` (any case), or `converted`.
pub fn base_name(original: Option<&str>) -> String {
    let name = original.unwrap_or_default();
    let stem = name
        .len()
        .checked_sub(4)
        .and_then(|cut| {
            name.get(cut..)
                .filter(|ext| ext.eq_ignore_ascii_case(".pdf"))
                .map(|_| &name[..cut])
        })
        .unwrap_or(name);

    if stem.is_empty() {
        FALLBACK_BASE_NAME.to_string()
    } else {
        stem.to_string()
    }
}

/// `<base>.md`.
pub fn markdown_filename(original: Option<&str>) -> String {
    format!("{}.md", base_name(original))
}

/// `<base>_package.zip`.
pub fn archive_filename(original: Option<&str>) -> String {
    format!("{}_package.zip", base_name(original))
}

/// Result of a local composite save.
#[derive(Debug, Clone, Serialize)]
pub struct CompositeReport {
    pub markdown_path: PathBuf,
    pub images: Option<DownloadSummary>,
    pub guidance: Option<&'static str>,
}

impl CompositeReport {
    pub fn message(&self) -> String {
        let mut msg = format!("Saved {}.", self.markdown_path.display());
        if let Some(ref summary) = self.images {
            msg.push(' ');
            msg.push_str(&summary.message());
        }
        if let Some(guidance) = self.guidance {
            msg.push(' ');
            msg.push_str(guidance);
        }
        msg
    }
}

/// Result of a server-assembled archive save.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveReport {
    pub path: PathBuf,
    pub filename: String,
    pub image_count: usize,
    pub bytes: usize,
}

/// Save the current Markdown as `<base>.md`.
pub async fn save_markdown<S: ArtifactSink>(
    sink: &mut S,
    session: &mut SessionState,
) -> Result<PathBuf, ClientError> {
    let Some(markdown) = session.markdown() else {
        session.fail("There is no content to download.");
        return Err(ClientError::NothingToDownload { what: "no Markdown" });
    };
    let content = Bytes::from(markdown.to_owned());
    let filename = markdown_filename(session.original_filename());

    match sink.save(&filename, content).await {
        Ok(path) => {
            info!("Markdown saved to {}", path.display());
            Ok(path)
        }
        Err(e) => {
            session.fail(e.to_string());
            Err(e)
        }
    }
}

/// Download every image, wait for the saves to settle, then save the Markdown.
pub async fn save_local_composite<S: ArtifactSink>(
    service: &ServiceClient,
    sink: &mut S,
    session: &mut SessionState,
    config: &ClientConfig,
) -> Result<CompositeReport, ClientError> {
    if session.markdown().is_none() {
        session.fail("There is no content to download.");
        return Err(ClientError::NothingToDownload { what: "no Markdown" });
    }

    let images = session.images().to_vec();
    let summary = if images.is_empty() {
        None
    } else {
        let summary = download::download_all(service, sink, session, &images, config).await?;
        if config.settle_delay_ms > 0 {
            sleep(Duration::from_millis(config.settle_delay_ms)).await;
        }
        Some(summary)
    };

    let markdown_path = save_markdown(sink, session).await?;
    let report = CompositeReport {
        markdown_path,
        guidance: summary.as_ref().map(|_| LINK_GUIDANCE),
        images: summary,
    };

    match report.images {
        Some(ref s) if !s.is_complete() => session.fail(report.message()),
        _ => session.succeed(report.message()),
    }
    Ok(report)
}

/// Ask the service to zip Markdown and images, then save the archive.
pub async fn save_server_archive<S: ArtifactSink>(
    service: &ServiceClient,
    sink: &mut S,
    session: &mut SessionState,
) -> Result<ArchiveReport, ClientError> {
    let Some(result) = session.result().filter(|r| !r.markdown.is_empty()) else {
        session.fail("There is no content to download.");
        return Err(ClientError::NothingToDownload { what: "no Markdown" });
    };

    let original = session.original_filename().map(str::to_owned);
    let request_name = original.as_deref().unwrap_or(FALLBACK_BASE_NAME);
    let image_count = result.image_count();
    let request = PackageRequest {
        markdown_content: &result.markdown,
        images: &result.images,
        filename: request_name,
    };

    let outcome = match service.create_package(&request).await {
        Ok(bytes) => {
            let filename = archive_filename(original.as_deref());
            let len = bytes.len();
            sink.save(&filename, bytes).await.map(|path| ArchiveReport {
                path,
                filename,
                image_count,
                bytes: len,
            })
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(report) => {
            session.succeed(format!(
                "Package downloaded: {} (Markdown and {} images).",
                report.filename, report.image_count
            ));
            Ok(report)
        }
        Err(e) => {
            session.fail(format!("Failed to download the package: {e}"));
            Err(e)
        }
    }
}
