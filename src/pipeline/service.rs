//! Wire layer for the remote conversion service.
//!
//! One method per endpoint. Every method returns either the decoded payload
//! or a [`ClientError`] that already carries the user-facing message:
//! the service's own `message` when it sent one, [`GENERIC_FAILURE`]
//! otherwise, and a distinct transport error when no response arrived.
//!
//! ```text
//! POST /api/convert_pdf_to_md      multipart file → JSON
//! POST /api/convert_pdf_to_images  multipart file → archive
//! POST /api/convert_pdf_to_word    multipart file → .docx
//! GET  /api/images/{filename}      → image bytes
//! POST /api/create_package         JSON → archive
//! GET  /health                     → JSON
//! ```

use crate::config::ClientConfig;
use crate::error::{AssetError, ClientError, GENERIC_FAILURE};
use crate::pipeline::gate::{SelectedFile, PDF_MEDIA_TYPE};
use crate::session::ImageAsset;
use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Archive name used when the cropped-images response carries no hint.
pub const DEFAULT_IMAGES_ARCHIVE: &str = "cropped_images.zip";

/// Document name used when the Word response carries no hint.
pub const DEFAULT_WORD_DOCUMENT: &str = "converted.docx";

/// Decoded success body of `POST /api/convert_pdf_to_md`.
#[derive(Debug, Clone)]
pub struct MarkdownPayload {
    pub markdown: String,
    pub filename: Option<String>,
    pub images: Vec<ImageAsset>,
    pub image_count: Option<usize>,
}

/// A binary deliverable and the name it should be saved under.
#[derive(Debug, Clone)]
pub struct BinaryArtifact {
    pub filename: String,
    pub bytes: Bytes,
}

/// Body of `POST /api/create_package`.
#[derive(Debug, Clone, Serialize)]
pub struct PackageRequest<'a> {
    pub markdown_content: &'a str,
    pub images: &'a [ImageAsset],
    pub filename: &'a str,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl ServiceHealth {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[derive(Debug, Deserialize)]
struct MarkdownResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    markdown_content: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    images: Option<Vec<ImageAsset>>,
    #[serde(default)]
    image_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client bound to one conversion service.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: reqwest::Client,
    base: Url,
}

impl ServiceClient {
    /// Build a client from the session configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut base = Url::parse(&config.base_url).map_err(|e| {
            ClientError::InvalidConfig(format!("base URL '{}' is invalid: {}", config.base_url, e))
        })?;
        // Endpoints are joined relative to the base, which needs a trailing slash.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self { http, base })
    }

    /// Base URL every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path)
            .map_err(|e| ClientError::Internal(format!("endpoint '{path}': {e}")))
    }

    /// URL of one extracted image.
    pub fn image_url(&self, filename: &str) -> Result<Url, ClientError> {
        let mut url = self.endpoint("api/images/")?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Internal("base URL cannot carry a path".into()))?
            .pop_if_empty()
            .push(filename);
        Ok(url)
    }

    /// `POST /api/convert_pdf_to_md`.
    pub async fn convert_to_markdown(
        &self,
        file: &SelectedFile,
    ) -> Result<MarkdownPayload, ClientError> {
        let url = self.endpoint("api/convert_pdf_to_md")?;
        let response = self.upload(&url, file).await?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::transport(url.as_str(), &e))?;

        let parsed: MarkdownResponse = match serde_json::from_slice(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Unreadable response from {} ({}): {}", url, status, e);
                return Err(ClientError::Service {
                    status: status.as_u16(),
                    message: GENERIC_FAILURE.to_string(),
                });
            }
        };

        if status.is_success() && parsed.status.as_deref() == Some("success") {
            let markdown = parsed.markdown_content.unwrap_or_default();
            debug!("Received {} bytes of Markdown", markdown.len());
            Ok(MarkdownPayload {
                markdown,
                filename: parsed.filename,
                images: parsed.images.unwrap_or_default(),
                image_count: parsed.image_count,
            })
        } else {
            Err(ClientError::Service {
                status: status.as_u16(),
                message: parsed
                    .message
                    .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            })
        }
    }

    /// `POST /api/convert_pdf_to_images`.
    pub async fn convert_to_images(&self, file: &SelectedFile) -> Result<BinaryArtifact, ClientError> {
        let url = self.endpoint("api/convert_pdf_to_images")?;
        let response = self.upload(&url, file).await?;
        download_artifact(&url, response, DEFAULT_IMAGES_ARCHIVE).await
    }

    /// `POST /api/convert_pdf_to_word`.
    pub async fn convert_to_word(&self, file: &SelectedFile) -> Result<BinaryArtifact, ClientError> {
        let url = self.endpoint("api/convert_pdf_to_word")?;
        let response = self.upload(&url, file).await?;
        download_artifact(&url, response, DEFAULT_WORD_DOCUMENT).await
    }

    /// `GET /api/images/{filename}`.
    pub async fn fetch_image(&self, filename: &str) -> Result<Bytes, AssetError> {
        let url = self.image_url(filename).map_err(|e| AssetError::Transport {
            filename: filename.to_string(),
            detail: e.to_string(),
        })?;
        debug!("Fetching image {}", url);

        let transport = |e: reqwest::Error| AssetError::Transport {
            filename: filename.to_string(),
            detail: e.to_string(),
        };

        let response = self.http.get(url).send().await.map_err(transport)?;
        if !response.status().is_success() {
            return Err(AssetError::Fetch {
                filename: filename.to_string(),
                status: response.status().as_u16(),
            });
        }
        response.bytes().await.map_err(transport)
    }

    /// `POST /api/create_package`.
    pub async fn create_package(&self, request: &PackageRequest<'_>) -> Result<Bytes, ClientError> {
        let url = self.endpoint("api/create_package")?;
        info!(
            "Requesting package for {} with {} images",
            request.filename,
            request.images.len()
        );
        let response = self
            .http
            .post(url.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::transport(url.as_str(), &e))?;

        if !response.status().is_success() {
            return Err(service_error(&url, response, "Failed to create the package.").await);
        }
        response
            .bytes()
            .await
            .map_err(|e| ClientError::transport(url.as_str(), &e))
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<ServiceHealth, ClientError> {
        let url = self.endpoint("health")?;
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ClientError::transport(url.as_str(), &e))?;

        if !response.status().is_success() {
            return Err(service_error(&url, response, GENERIC_FAILURE).await);
        }
        response.json::<ServiceHealth>().await.map_err(|e| ClientError::Service {
            status: 200,
            message: format!("Unreadable health response: {e}"),
        })
    }

    async fn upload(&self, url: &Url, file: &SelectedFile) -> Result<Response, ClientError> {
        let content = file.read_content().await?;
        info!("Uploading {} ({} bytes) to {}", file.name, content.len(), url);

        let part = Part::bytes(content.to_vec())
            .file_name(file.name.clone())
            .mime_str(PDF_MEDIA_TYPE)
            .map_err(|e| ClientError::Internal(format!("multipart: {e}")))?;
        let form = Form::new().part("file", part);

        self.http
            .post(url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::transport(url.as_str(), &e))
    }
}

/// Read a binary success body, or turn a failure body into a service error.
async fn download_artifact(
    url: &Url,
    response: Response,
    default_name: &str,
) -> Result<BinaryArtifact, ClientError> {
    if !response.status().is_success() {
        return Err(service_error(url, response, GENERIC_FAILURE).await);
    }

    let filename = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(filename_from_disposition)
        .unwrap_or_else(|| default_name.to_string());

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ClientError::transport(url.as_str(), &e))?;
    debug!("Received {} ({} bytes)", filename, bytes.len());

    Ok(BinaryArtifact { filename, bytes })
}

async fn service_error(url: &Url, response: Response, fallback: &str) -> ClientError {
    let status = response.status();
    let message = match response.bytes().await {
        Ok(body) => serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty()),
        Err(e) => {
            warn!("Could not read error body from {}: {}", url, e);
            None
        }
    };
    warn!("{} answered {}", url, status);
    ClientError::Service {
        status: status.as_u16(),
        message: message.unwrap_or_else(|| fallback.to_string()),
    }
}

static RE_DISPOSITION_FILENAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"filename="?([^";]+)"?"#).expect("valid disposition regex"));

/// Extract the suggested filename from a `Content-Disposition` value.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    RE_DISPOSITION_FILENAME
        .captures(header)
        .map(|caps| caps[1].trim().to_string())
        .filter(|name| !name.is_empty())
}
