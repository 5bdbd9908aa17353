//! Conversion entry points.
//!
//! [`Converter`] ties the pipeline stages to one service and one local
//! sink. It holds no session data itself: every operation takes the
//! caller's [`SessionState`] by `&mut` and leaves it consistent whether the
//! operation succeeds or fails.
//!
//! Conversions are exclusive. The session's busy flag is raised before
//! dispatch and lowered on every exit path, including a dropped future, so
//! a second conversion started while one is outstanding fails fast with
//! [`ClientError::Busy`]. Image downloads and package saves do not take the
//! flag.

use crate::config::ClientConfig;
use crate::error::{ClientError, ValidationError};
use crate::pipeline::download::{self, DownloadSummary};
use crate::pipeline::gate::{CandidateFile, SelectedFile};
use crate::pipeline::package::{self, ArchiveReport, CompositeReport};
use crate::pipeline::rewrite;
use crate::pipeline::service::{BinaryArtifact, MarkdownPayload, ServiceClient, ServiceHealth};
use crate::pipeline::sink::ArtifactSink;
use crate::session::{ConversionResult, ImageAsset, SessionState};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Which binary deliverable to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryKind {
    CroppedImages,
    Word,
}

impl BinaryKind {
    fn label(self) -> &'static str {
        match self {
            BinaryKind::CroppedImages => "Cropped images archive",
            BinaryKind::Word => "Word document",
        }
    }
}

/// A binary deliverable saved locally.
#[derive(Debug, Clone, Serialize)]
pub struct SavedArtifact {
    pub filename: String,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Drives conversions against one service, saving into one sink.
pub struct Converter<S> {
    config: ClientConfig,
    service: ServiceClient,
    sink: S,
}

impl<S: ArtifactSink> Converter<S> {
    pub fn new(config: ClientConfig, sink: S) -> Result<Self, ClientError> {
        let service = ServiceClient::new(&config)?;
        Ok(Self {
            config,
            service,
            sink,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn service(&self) -> &ServiceClient {
        &self.service
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    // ── Selection ────────────────────────────────────────────────────────

    /// Offer a candidate to the session under this client's size limit.
    pub fn select<'s>(
        &self,
        session: &'s mut SessionState,
        candidate: CandidateFile,
    ) -> Result<&'s SelectedFile, ValidationError> {
        session.select_file(candidate, self.config.max_file_size)
    }

    /// Offer a file on disk to the session.
    pub fn select_path(
        &self,
        session: &mut SessionState,
        path: impl AsRef<Path>,
    ) -> Result<(), ClientError> {
        let candidate = match CandidateFile::from_path(path) {
            Ok(c) => c,
            Err(e) => {
                session.fail(e.to_string());
                return Err(e);
            }
        };
        self.select(session, candidate)?;
        Ok(())
    }

    // ── Conversions ──────────────────────────────────────────────────────

    /// Convert the selected file to Markdown and store the result.
    ///
    /// Prior output is cleared before dispatch, so a failed attempt leaves
    /// the session without a result.
    pub async fn to_markdown(
        &self,
        session: &mut SessionState,
    ) -> Result<ConversionResult, ClientError> {
        let file = selected_file(session)?;
        let mut session = session.start_conversion()?;
        session.clear_output();

        match self.service.convert_to_markdown(&file).await {
            Ok(payload) => {
                let result = build_result(payload);
                info!(
                    "Converted {} to Markdown with {} images",
                    file.name,
                    result.image_count()
                );
                session.set_result(result.clone());
                Ok(result)
            }
            Err(e) => {
                warn!("Markdown conversion failed: {}", e);
                session.fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Request the cropped-images archive and save it.
    pub async fn to_cropped_images(
        &mut self,
        session: &mut SessionState,
    ) -> Result<SavedArtifact, ClientError> {
        self.deliver_binary(session, BinaryKind::CroppedImages).await
    }

    /// Request the Word document and save it.
    pub async fn to_word(&mut self, session: &mut SessionState) -> Result<SavedArtifact, ClientError> {
        self.deliver_binary(session, BinaryKind::Word).await
    }

    async fn deliver_binary(
        &mut self,
        session: &mut SessionState,
        kind: BinaryKind,
    ) -> Result<SavedArtifact, ClientError> {
        let file = selected_file(session)?;
        let mut session = session.start_conversion()?;

        let outcome = match kind {
            BinaryKind::CroppedImages => self.service.convert_to_images(&file).await,
            BinaryKind::Word => self.service.convert_to_word(&file).await,
        };
        let outcome = match outcome {
            Ok(artifact) => self.save_artifact(artifact).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(saved) => {
                session.succeed(format!("{} downloaded: {}", kind.label(), saved.filename));
                Ok(saved)
            }
            Err(e) => {
                warn!("{} failed: {}", kind.label(), e);
                session.fail(e.to_string());
                Err(e)
            }
        }
    }

    async fn save_artifact(&mut self, artifact: BinaryArtifact) -> Result<SavedArtifact, ClientError> {
        let bytes = artifact.bytes.len();
        let path = self.sink.save(&artifact.filename, artifact.bytes).await?;
        Ok(SavedArtifact {
            filename: artifact.filename,
            path,
            bytes,
        })
    }

    // ── Downloads and packaging ──────────────────────────────────────────

    /// Download one image of the current result.
    pub async fn download_image(
        &mut self,
        session: &mut SessionState,
        asset: &ImageAsset,
    ) -> Result<PathBuf, ClientError> {
        Ok(download::download_one(&self.service, &mut self.sink, session, asset).await?)
    }

    /// Download every image of the current result, in order.
    pub async fn download_all_images(
        &mut self,
        session: &mut SessionState,
    ) -> Result<DownloadSummary, ClientError> {
        let images = session.images().to_vec();
        download::download_all(&self.service, &mut self.sink, session, &images, &self.config).await
    }

    /// Save only the Markdown as `<base>.md`.
    pub async fn save_markdown(&mut self, session: &mut SessionState) -> Result<PathBuf, ClientError> {
        package::save_markdown(&mut self.sink, session).await
    }

    /// Save the Markdown and every image side by side.
    pub async fn save_local_composite(
        &mut self,
        session: &mut SessionState,
    ) -> Result<CompositeReport, ClientError> {
        package::save_local_composite(&self.service, &mut self.sink, session, &self.config).await
    }

    /// Have the service build `<base>_package.zip` and save it.
    pub async fn save_server_archive(
        &mut self,
        session: &mut SessionState,
    ) -> Result<ArchiveReport, ClientError> {
        package::save_server_archive(&self.service, &mut self.sink, session).await
    }

    /// Copy the current Markdown to the clipboard.
    pub async fn copy_markdown(&mut self, session: &mut SessionState) -> Result<(), ClientError> {
        let Some(markdown) = session.markdown().map(str::to_owned) else {
            session.fail("There is no content to copy.");
            return Err(ClientError::NothingToDownload { what: "no Markdown" });
        };
        match self.sink.copy_text(&markdown).await {
            Ok(()) => {
                session.succeed("Copied!");
                Ok(())
            }
            Err(e) => {
                session.fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Ask the service whether it is up.
    pub async fn health(&self) -> Result<ServiceHealth, ClientError> {
        self.service.health().await
    }
}

fn selected_file(session: &mut SessionState) -> Result<SelectedFile, ClientError> {
    match session.selected() {
        Some(file) => Ok(file.clone()),
        None => {
            session.fail(ClientError::NoFileSelected.to_string());
            Err(ClientError::NoFileSelected)
        }
    }
}

/// Normalise a service payload into a session result.
fn build_result(payload: MarkdownPayload) -> ConversionResult {
    let images: Vec<ImageAsset> = payload.images.into_iter().map(ImageAsset::normalize).collect();

    if let Some(reported) = payload.image_count {
        if reported != images.len() {
            warn!(
                "Service reported {} images but listed {}; using the list",
                reported,
                images.len()
            );
        }
    }

    let referenced = rewrite::count_image_refs(&payload.markdown);
    if referenced != images.len() {
        debug!(
            "Markdown references {} images, service listed {}",
            referenced,
            images.len()
        );
    }

    ConversionResult {
        markdown: rewrite::rewrite(&payload.markdown),
        images,
        filename: payload.filename,
    }
}
