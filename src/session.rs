//! Session state: everything one selection-to-clear cycle knows.
//!
//! There is exactly one [`SessionState`] per session. It is owned by the
//! caller and handed to pipeline operations by `&mut` reference; fields are
//! private so every mutation goes through a named operation, and
//! [`SessionState::clear_file`] returns it to the empty state.

use crate::error::{ClientError, ValidationError};
use crate::pipeline::gate::{self, CandidateFile, SelectedFile};
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use tracing::{debug, info, warn};

/// One image extracted by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    /// Canonical name, unique within a result; used to fetch and to save.
    pub filename: String,
    /// Server-reported location hint. Advisory only.
    #[serde(default)]
    pub path: Option<String>,
    /// Any other fields the service sent (page, index, dimensions), passed
    /// back untouched when a package is requested.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ImageAsset {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            path: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Fill in a missing or empty access path with the filename.
    pub fn normalize(mut self) -> Self {
        if self.path.as_deref().is_none_or(str::is_empty) {
            self.path = Some(self.filename.clone());
        }
        self
    }
}

/// Outcome of a successful to-Markdown conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub markdown: String,
    pub images: Vec<ImageAsset>,
    /// Output name reported by the service, which may differ from the upload.
    pub filename: Option<String>,
}

impl ConversionResult {
    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

/// Filenames saved locally during this session, in save order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadLedger {
    saved: Vec<String>,
}

impl DownloadLedger {
    /// Record a successful save. Returns false if it was already recorded.
    pub fn record(&mut self, filename: &str) -> bool {
        if self.contains(filename) {
            return false;
        }
        self.saved.push(filename.to_string());
        true
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.saved.iter().any(|f| f == filename)
    }

    pub fn len(&self) -> usize {
        self.saved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.saved.iter().map(String::as_str)
    }

    fn clear(&mut self) {
        self.saved.clear();
    }
}

/// The single, explicitly owned session.
#[derive(Debug, Default)]
pub struct SessionState {
    selected: Option<SelectedFile>,
    result: Option<ConversionResult>,
    ledger: DownloadLedger,
    busy: bool,
    drag_active: bool,
    error: Option<String>,
    notice: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Selection ────────────────────────────────────────────────────────

    /// Run the file gate and, on acceptance, start over with the new file.
    ///
    /// A rejection records the error message and keeps the current file.
    pub fn select_file(
        &mut self,
        candidate: CandidateFile,
        max_size: u64,
    ) -> Result<&SelectedFile, ValidationError> {
        match gate::validate(candidate, max_size) {
            Ok(file) => {
                info!("Selected {} ({})", file.name, file.display_size());
                self.clear_output();
                self.clear_error();
                Ok(&*self.selected.insert(file))
            }
            Err(e) => {
                warn!("Rejected file: {}", e);
                self.fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Handle a drop: the first candidate is selected, the rest ignored.
    pub fn drop_candidates(
        &mut self,
        candidates: impl IntoIterator<Item = CandidateFile>,
        max_size: u64,
    ) -> Option<Result<&SelectedFile, ValidationError>> {
        self.drag_active = false;
        let first = candidates.into_iter().next()?;
        Some(self.select_file(first, max_size))
    }

    /// Forget the file and everything derived from it.
    pub fn clear_file(&mut self) {
        debug!("Session cleared");
        *self = Self::default();
    }

    /// Drop the conversion result and the download ledger.
    pub fn clear_output(&mut self) {
        self.result = None;
        self.ledger.clear();
        self.notice = None;
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    /// Name of the source document: the service's name for it once known,
    /// otherwise the name of the selected file.
    pub fn original_filename(&self) -> Option<&str> {
        self.result
            .as_ref()
            .and_then(|r| r.filename.as_deref())
            .filter(|n| !n.is_empty())
            .or_else(|| self.selected.as_ref().map(|f| f.name.as_str()))
    }

    // ── Conversion ───────────────────────────────────────────────────────

    /// Mark a conversion as in flight.
    pub fn begin_conversion(&mut self) -> Result<(), ClientError> {
        if self.busy {
            self.fail(ClientError::Busy.to_string());
            return Err(ClientError::Busy);
        }
        self.busy = true;
        self.clear_error();
        Ok(())
    }

    /// Clear the busy flag. Called on every exit path of a conversion.
    pub fn finish_conversion(&mut self) {
        self.busy = false;
    }

    /// Like [`begin_conversion`](Self::begin_conversion), but the flag is
    /// lowered when the returned guard is dropped, including when the
    /// conversion future is cancelled.
    pub fn start_conversion(&mut self) -> Result<ConversionGuard<'_>, ClientError> {
        self.begin_conversion()?;
        Ok(ConversionGuard { session: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn set_result(&mut self, result: ConversionResult) {
        self.result = Some(result);
    }

    pub fn result(&self) -> Option<&ConversionResult> {
        self.result.as_ref()
    }

    pub fn markdown(&self) -> Option<&str> {
        self.result
            .as_ref()
            .map(|r| r.markdown.as_str())
            .filter(|m| !m.is_empty())
    }

    pub fn images(&self) -> &[ImageAsset] {
        self.result
            .as_ref()
            .map(|r| r.images.as_slice())
            .unwrap_or(&[])
    }

    // ── Downloads ────────────────────────────────────────────────────────

    pub fn record_download(&mut self, filename: &str) {
        self.ledger.record(filename);
    }

    pub fn is_downloaded(&self, filename: &str) -> bool {
        self.ledger.contains(filename)
    }

    pub fn ledger(&self) -> &DownloadLedger {
        &self.ledger
    }

    // ── Flags and messages ───────────────────────────────────────────────

    pub fn set_drag_active(&mut self, active: bool) {
        self.drag_active = active;
    }

    pub fn is_drag_active(&self) -> bool {
        self.drag_active
    }

    /// Record a persistent, user-visible failure.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Record a transient success; clears any standing error.
    pub fn succeed(&mut self, message: impl Into<String>) {
        self.clear_error();
        self.notice = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}

/// Session access for the duration of one conversion.
///
/// Dereferences to the [`SessionState`]; dropping it clears the busy flag.
#[derive(Debug)]
pub struct ConversionGuard<'a> {
    session: &'a mut SessionState,
}

impl Deref for ConversionGuard<'_> {
    type Target = SessionState;

    fn deref(&self) -> &SessionState {
        self.session
    }
}

impl DerefMut for ConversionGuard<'_> {
    fn deref_mut(&mut self) -> &mut SessionState {
        self.session
    }
}

impl Drop for ConversionGuard<'_> {
    fn drop(&mut self) {
        self.session.finish_conversion();
    }
}
