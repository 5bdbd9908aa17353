//! Local save targets for finished artifacts.
//!
//! [`DirectorySink`] writes each artifact to a temp file inside the target
//! directory and renames it into place only once fully written. A failed
//! save leaves no partial file behind: the temp file is deleted when it
//! goes out of scope.

use crate::error::ClientError;
use base64::Engine;
use bytes::Bytes;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Somewhere artifacts can be saved and text can be copied to.
#[allow(async_fn_in_trait)]
pub trait ArtifactSink {
    /// Save `content` under `filename`, returning where it landed.
    async fn save(&mut self, filename: &str, content: Bytes) -> Result<PathBuf, ClientError>;

    /// Put `text` on the clipboard.
    async fn copy_text(&mut self, text: &str) -> Result<(), ClientError>;
}

/// Strip any directory components from a server-supplied name.
///
/// Returns `None` when nothing usable is left.
pub fn safe_filename(name: &str) -> Option<&str> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    match base {
        "" | "." | ".." => None,
        b => Some(b),
    }
}

/// Saves artifacts as files in one directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactSink for DirectorySink {
    async fn save(&mut self, filename: &str, content: Bytes) -> Result<PathBuf, ClientError> {
        let name = safe_filename(filename).ok_or_else(|| ClientError::SaveFailed {
            path: self.dir.join(filename),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty filename"),
        })?;
        let dir = self.dir.clone();
        let target = dir.join(name);
        let dest = target.clone();

        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            std::fs::create_dir_all(&dir)?;
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(&content)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&dest).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| ClientError::Internal(format!("save task: {e}")))?
        .map_err(|source| ClientError::SaveFailed {
            path: target.clone(),
            source,
        })?;

        debug!("Saved {}", target.display());
        Ok(target)
    }

    /// Writes an OSC 52 sequence, which most terminal emulators turn into a
    /// clipboard update.
    async fn copy_text(&mut self, text: &str) -> Result<(), ClientError> {
        let mut stderr = std::io::stderr();
        if !stderr.is_terminal() {
            return Err(ClientError::ClipboardUnavailable(
                "stderr is not a terminal".into(),
            ));
        }
        let payload = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
        write!(stderr, "\x1b]52;c;{payload}\x07")
            .and_then(|_| stderr.flush())
            .map_err(|e| ClientError::ClipboardUnavailable(e.to_string()))
    }
}

/// Keeps artifacts in memory; useful for previews and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub artifacts: Vec<(String, Bytes)>,
    pub clipboard: Option<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content saved under `filename`, latest save wins.
    pub fn get(&self, filename: &str) -> Option<&Bytes> {
        self.artifacts
            .iter()
            .rev()
            .find(|(name, _)| name == filename)
            .map(|(_, content)| content)
    }

    pub fn names(&self) -> Vec<&str> {
        self.artifacts.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl ArtifactSink for MemorySink {
    async fn save(&mut self, filename: &str, content: Bytes) -> Result<PathBuf, ClientError> {
        self.artifacts.push((filename.to_string(), content));
        Ok(PathBuf::from(filename))
    }

    async fn copy_text(&mut self, text: &str) -> Result<(), ClientError> {
        self.clipboard = Some(text.to_string());
        Ok(())
    }
}
