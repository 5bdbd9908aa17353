//! Image downloads: fetch extracted images and save them locally.
//!
//! Downloads are strictly sequential. Each image is fetched and saved (or
//! fails) before the next request is issued, with an optional courtesy
//! pause in between. A failed image is recorded and skipped; it never stops
//! the rest of the batch, and it never enters the download ledger.

use crate::config::ClientConfig;
use crate::error::{AssetError, ClientError};
use crate::pipeline::service::ServiceClient;
use crate::pipeline::sink::{safe_filename, ArtifactSink};
use crate::session::{ImageAsset, SessionState};
use serde::Serialize;
use std::path::PathBuf;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

/// Aggregate outcome of a bulk download.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadSummary {
    pub succeeded: usize,
    pub total: usize,
    pub failures: Vec<AssetError>,
}

impl DownloadSummary {
    /// `(successCount, totalCount)`.
    pub fn counts(&self) -> (usize, usize) {
        (self.succeeded, self.total)
    }

    pub fn is_complete(&self) -> bool {
        self.succeeded == self.total
    }

    /// One-line report for the user.
    pub fn message(&self) -> String {
        if self.is_complete() {
            format!("Downloaded {} images.", self.succeeded)
        } else {
            format!(
                "Download finished: {}/{} images saved.",
                self.succeeded, self.total
            )
        }
    }
}

/// Fetch one image by its canonical filename and save it under that name.
///
/// On success the filename enters the ledger. On failure the session error
/// is set and the ledger is left alone.
pub async fn download_one<S: ArtifactSink>(
    service: &ServiceClient,
    sink: &mut S,
    session: &mut SessionState,
    asset: &ImageAsset,
) -> Result<PathBuf, AssetError> {
    let outcome = fetch_and_save(service, sink, asset).await;
    match &outcome {
        Ok(_) => session.record_download(&asset.filename),
        Err(e) => {
            warn!("{}", e);
            session.fail(e.to_string());
        }
    }
    outcome.map(|(path, _)| path)
}

async fn fetch_and_save<S: ArtifactSink>(
    service: &ServiceClient,
    sink: &mut S,
    asset: &ImageAsset,
) -> Result<(PathBuf, usize), AssetError> {
    // The ledger records this exact name, so it must be saved unchanged.
    if safe_filename(&asset.filename) != Some(asset.filename.as_str()) {
        return Err(AssetError::InvalidName {
            filename: asset.filename.clone(),
        });
    }
    let bytes = service.fetch_image(&asset.filename).await?;
    let len = bytes.len();
    let path = sink
        .save(&asset.filename, bytes)
        .await
        .map_err(|e| AssetError::Save {
            filename: asset.filename.clone(),
            detail: e.to_string(),
        })?;
    Ok((path, len))
}

/// Download every asset in order and report how many made it.
pub async fn download_all<S: ArtifactSink>(
    service: &ServiceClient,
    sink: &mut S,
    session: &mut SessionState,
    assets: &[ImageAsset],
    config: &ClientConfig,
) -> Result<DownloadSummary, ClientError> {
    if assets.is_empty() {
        session.fail("There are no images to download.");
        return Err(ClientError::NothingToDownload { what: "no images" });
    }

    let total = assets.len();
    let progress = config.progress_callback.as_ref();
    if let Some(cb) = progress {
        cb.on_download_start(total);
    }
    info!("Downloading {} images", total);

    let mut summary = DownloadSummary {
        total,
        ..Default::default()
    };

    for (i, asset) in assets.iter().enumerate() {
        if i > 0 && config.download_delay_ms > 0 {
            sleep(Duration::from_millis(config.download_delay_ms)).await;
        }

        let index = i + 1;
        if let Some(cb) = progress {
            cb.on_asset_start(index, total, &asset.filename);
        }

        match fetch_and_save(service, sink, asset).await {
            Ok((_, len)) => {
                session.record_download(&asset.filename);
                summary.succeeded += 1;
                if let Some(cb) = progress {
                    cb.on_asset_complete(index, total, &asset.filename, len);
                }
            }
            Err(e) => {
                warn!("{}", e);
                session.fail(e.to_string());
                if let Some(cb) = progress {
                    cb.on_asset_error(index, total, &asset.filename, &e.to_string());
                }
                summary.failures.push(e);
            }
        }
    }

    if let Some(cb) = progress {
        cb.on_download_complete(total, summary.succeeded);
    }
    info!("{}", summary.message());

    if summary.is_complete() {
        session.succeed(summary.message());
    } else {
        session.fail(summary.message());
    }
    Ok(summary)
}
