//! # pdf2md-client
//!
//! Client for a remote PDF conversion service. Submit a PDF, get back
//! Markdown with correctly linked images, a cropped-images archive, a Word
//! document, or a single packaged archive.
//!
//! The service does the heavy lifting (PDF parsing, image cropping, Word
//! generation, zipping). This crate orchestrates the calls and reconciles
//! the results into a consistent local artifact.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Gate      type/size policy, nothing leaves the machine on rejection
//!  ├─ 2. Convert   one request in flight: Markdown, cropped images, or Word
//!  ├─ 3. Rewrite   /api/images/… links → bare local filenames
//!  ├─ 4. Download  images fetched one by one, tracked in a ledger
//!  └─ 5. Package   <name>.md + images side by side, or <name>_package.zip
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2md_client::{ClientConfig, Converter, DirectorySink, SessionState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .base_url("http://localhost:5000")
//!         .build()?;
//!     let mut converter = Converter::new(config, DirectorySink::new("out"))?;
//!     let mut session = SessionState::new();
//!
//!     converter.select_path(&mut session, "report.pdf")?;
//!     converter.to_markdown(&mut session).await?;
//!     let report = converter.save_local_composite(&mut session).await?;
//!     println!("{}", report.message());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2md-client` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ClientConfig, ClientConfigBuilder};
pub use convert::{Converter, SavedArtifact};
pub use error::{AssetError, ClientError, ValidationError};
pub use pipeline::download::DownloadSummary;
pub use pipeline::gate::{format_file_size, CandidateFile, SelectedFile};
pub use pipeline::package::{ArchiveReport, CompositeReport};
pub use pipeline::rewrite::rewrite;
pub use pipeline::service::{ServiceClient, ServiceHealth};
pub use pipeline::sink::{ArtifactSink, DirectorySink, MemorySink};
pub use progress::{DownloadProgressCallback, NoopProgressCallback, ProgressCallback};
pub use session::{ConversionGuard, ConversionResult, DownloadLedger, ImageAsset, SessionState};
