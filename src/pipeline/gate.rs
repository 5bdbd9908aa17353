//! File gate: admit a candidate PDF into the session or refuse it.
//!
//! Validation is purely local. A refused candidate never reaches the
//! network and its content is never read: size comes from file metadata,
//! the declared type from the first four bytes (`%PDF`) or the extension.

use crate::error::{ClientError, ValidationError};
use bytes::Bytes;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Media type the service accepts.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Where the bytes of a file live.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// A file on disk, read when the file is sent.
    Path(PathBuf),
    /// Content already in memory.
    Memory(Bytes),
}

/// A file offered by the user, not yet validated.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub media_type: String,
    pub size: u64,
    pub source: FileSource,
}

impl CandidateFile {
    /// Wrap in-memory content with an explicit declared type.
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size: content.len() as u64,
            source: FileSource::Memory(content),
        }
    }

    /// Describe a file on disk without reading more than its first bytes.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref().to_path_buf();
        let read_failed = |source| ClientError::ReadFailed {
            path: path.clone(),
            source,
        };

        let metadata = std::fs::metadata(&path).map_err(read_failed)?;
        if !metadata.is_file() {
            return Err(read_failed(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }

        let mut magic = [0u8; 4];
        let has_pdf_magic = std::fs::File::open(&path)
            .map_err(read_failed)?
            .read_exact(&mut magic)
            .is_ok()
            && &magic == b"%PDF";

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let media_type = if has_pdf_magic || has_pdf_extension(&name) {
            PDF_MEDIA_TYPE
        } else {
            "application/octet-stream"
        };

        debug!(
            "Candidate {}: {} bytes, declared {}",
            path.display(),
            metadata.len(),
            media_type
        );

        Ok(Self {
            name,
            media_type: media_type.to_string(),
            size: metadata.len(),
            source: FileSource::Path(path),
        })
    }
}

/// A candidate that passed the gate.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub media_type: String,
    pub size: u64,
    source: FileSource,
}

impl SelectedFile {
    /// Load the file content for upload.
    pub async fn read_content(&self) -> Result<Bytes, ClientError> {
        match &self.source {
            FileSource::Memory(bytes) => Ok(bytes.clone()),
            FileSource::Path(path) => tokio::fs::read(path)
                .await
                .map(Bytes::from)
                .map_err(|source| ClientError::ReadFailed {
                    path: path.clone(),
                    source,
                }),
        }
    }

    /// Human-readable size, e.g. `2.5 MB`.
    pub fn display_size(&self) -> String {
        format_file_size(self.size)
    }
}

/// Validate a candidate against type and size policy.
pub fn validate(candidate: CandidateFile, max_size: u64) -> Result<SelectedFile, ValidationError> {
    if candidate.media_type != PDF_MEDIA_TYPE && !has_pdf_extension(&candidate.name) {
        return Err(ValidationError::InvalidType {
            name: candidate.name,
            media_type: candidate.media_type,
        });
    }

    if candidate.size > max_size {
        return Err(ValidationError::TooLarge {
            name: candidate.name,
            size: candidate.size,
            limit: max_size,
        });
    }

    Ok(SelectedFile {
        name: candidate.name,
        media_type: candidate.media_type,
        size: candidate.size,
        source: candidate.source,
    })
}

fn has_pdf_extension(name: &str) -> bool {
    name.to_lowercase().ends_with(".pdf")
}

/// Format a byte count with binary units: `0 Bytes`, `1.5 KB`, `2 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}
