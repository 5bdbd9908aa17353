//! Progress-callback trait for bulk image downloads.
//!
//! Inject an [`Arc<dyn DownloadProgressCallback>`] via
//! [`crate::config::ClientConfigBuilder::progress_callback`] to receive an
//! event for every image fetched by
//! [`crate::pipeline::download::download_all`].
//!
//! # Example
//!
//! ```rust
//! use pdf2md_client::{ClientConfig, DownloadProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     saved: AtomicUsize,
//! }
//!
//! impl DownloadProgressCallback for CountingCallback {
//!     fn on_asset_complete(&self, index: usize, total: usize, filename: &str, bytes: usize) {
//!         self.saved.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} {} ({} bytes)", index, total, filename, bytes);
//!     }
//! }
//!
//! let config = ClientConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { saved: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the downloader as it works through an image list.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Indices are 1-based.
pub trait DownloadProgressCallback: Send + Sync {
    /// Called once before the first image is requested.
    fn on_download_start(&self, total: usize) {
        let _ = total;
    }

    /// Called just before an image is requested.
    fn on_asset_start(&self, index: usize, total: usize, filename: &str) {
        let _ = (index, total, filename);
    }

    /// Called when an image has been saved locally.
    fn on_asset_complete(&self, index: usize, total: usize, filename: &str, bytes: usize) {
        let _ = (index, total, filename, bytes);
    }

    /// Called when an image could not be fetched or saved.
    fn on_asset_error(&self, index: usize, total: usize, filename: &str, error: &str) {
        let _ = (index, total, filename, error);
    }

    /// Called once after every image has been attempted.
    fn on_download_complete(&self, total: usize, success_count: usize) {
        let _ = (total, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl DownloadProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ClientConfig`].
pub type ProgressCallback = Arc<dyn DownloadProgressCallback>;
