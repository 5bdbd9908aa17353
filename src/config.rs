//! Configuration for the conversion client.
//!
//! All client behaviour is controlled through [`ClientConfig`], built via its
//! [`ClientConfigBuilder`]. One struct holds every knob so a session can be
//! logged, cloned into a test, or diffed against another run.

use crate::error::ClientError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Default address of the conversion service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Largest PDF the client will submit: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Configuration for a conversion session.
///
/// # Example
/// ```rust
/// use pdf2md_client::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("http://localhost:5000")
///     .download_delay_ms(0)
///     .build()
///     .unwrap();
/// assert_eq!(config.download_delay_ms, 0);
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Root URL of the conversion service. Default: `http://localhost:5000`.
    pub base_url: String,

    /// Maximum accepted PDF size in bytes. Default: 50 MiB.
    pub max_file_size: u64,

    /// Pause between consecutive image downloads in milliseconds. Default: 100.
    ///
    /// Only a courtesy delay; `0` is valid and does not change results.
    pub download_delay_ms: u64,

    /// Pause between the last image save and the Markdown save of a local
    /// composite package, in milliseconds. Default: 500.
    pub settle_delay_ms: u64,

    /// Per-request timeout in seconds. Default: none.
    ///
    /// With no timeout a hung request keeps the session busy until the
    /// transport gives up on its own.
    pub request_timeout_secs: Option<u64>,

    /// Receives per-image download events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            download_delay_ms: 100,
            settle_delay_ms: 500,
            request_timeout_secs: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("max_file_size", &self.max_file_size)
            .field("download_delay_ms", &self.download_delay_ms)
            .field("settle_delay_ms", &self.settle_delay_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn DownloadProgressCallback>"),
            )
            .finish()
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    pub fn download_delay_ms(mut self, ms: u64) -> Self {
        self.config.download_delay_ms = ms;
        self
    }

    pub fn settle_delay_ms(mut self, ms: u64) -> Self {
        self.config.settle_delay_ms = ms;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, ClientError> {
        let c = &self.config;
        let url = reqwest::Url::parse(&c.base_url).map_err(|e| {
            ClientError::InvalidConfig(format!("base URL '{}' is invalid: {}", c.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidConfig(format!(
                "base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if c.max_file_size == 0 {
            return Err(ClientError::InvalidConfig(
                "Maximum file size must be ≥ 1 byte".into(),
            ));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(ClientError::InvalidConfig(
                "Request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
