//! Error types for the pdf2md-client library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ClientError`] is **fatal** for the action that raised it: the file was
//!   rejected, the service refused the request, or it could not be reached.
//!   Returned as `Err(ClientError)` from every [`crate::convert::Converter`]
//!   operation.
//!
//! * [`AssetError`] is **non-fatal**: a single image could not be fetched or
//!   saved during a bulk download. Collected inside
//!   [`crate::pipeline::download::DownloadSummary`] so sibling downloads keep
//!   going and the caller gets a per-item report.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Message shown when the service answers with a failure but no message.
pub const GENERIC_FAILURE: &str = "Conversion failed, please try again.";

/// A candidate file was refused before anything reached the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Neither the declared media type nor the name says PDF.
    #[error("'{name}' is not a PDF file (type: {media_type}). Please choose a PDF file.")]
    InvalidType { name: String, media_type: String },

    /// File is bigger than the configured limit.
    #[error("'{name}' is {size} bytes, which exceeds the {limit}-byte limit.")]
    TooLarge { name: String, size: u64, limit: u64 },
}

/// All fatal errors returned by the pdf2md-client library.
#[derive(Debug, Error)]
pub enum ClientError {
    // ── Local errors ──────────────────────────────────────────────────────
    /// The selected file failed type/size policy.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A conversion is already in flight.
    #[error("A conversion is already in progress.")]
    Busy,

    /// An action needs a selected file but none is set.
    #[error("No file selected.")]
    NoFileSelected,

    /// There is no Markdown or no image to deliver.
    #[error("Nothing to download: {what}")]
    NothingToDownload { what: &'static str },

    // ── Service errors ────────────────────────────────────────────────────
    /// The service answered with a structured (or unreadable) failure.
    #[error("{message}")]
    Service { status: u16, message: String },

    /// No usable response came back.
    #[error("Network error or no response from '{url}'. Check that the conversion service is running.\n{detail}")]
    Transport { url: String, detail: String },

    /// A single asset failed outside of a bulk download.
    #[error(transparent)]
    Asset(#[from] AssetError),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not open or read the input file.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write an artifact to local storage.
    #[error("Failed to save '{path}': {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No clipboard is reachable from this process.
    #[error("Copy failed ({0}); select the text and copy it manually.")]
    ClipboardUnavailable(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Build a [`ClientError::Transport`] from a reqwest failure.
    pub(crate) fn transport(url: impl Into<String>, err: &reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            detail: err.to_string(),
        }
    }

    /// True for errors raised before any request was dispatched.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Busy | Self::NoFileSelected | Self::NothingToDownload { .. }
        )
    }
}

/// A non-fatal error for a single image asset.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum AssetError {
    /// Service answered with a non-success status.
    #[error("Downloading image {filename} failed: HTTP {status}")]
    Fetch { filename: String, status: u16 },

    /// Request never got a response.
    #[error("Downloading image {filename} failed: {detail}")]
    Transport { filename: String, detail: String },

    /// Bytes arrived but could not be written locally.
    #[error("Saving image {filename} failed: {detail}")]
    Save { filename: String, detail: String },

    /// The name cannot be saved as given (empty, or has directory parts).
    #[error("Image {filename} has an unusable filename")]
    InvalidName { filename: String },
}

impl AssetError {
    /// Filename of the asset that failed.
    pub fn filename(&self) -> &str {
        match self {
            Self::Fetch { filename, .. }
            | Self::Transport { filename, .. }
            | Self::Save { filename, .. }
            | Self::InvalidName { filename } => filename,
        }
    }
}
