//! Page fetching
//!
//! Everything that talks to the network sits behind [`FetchClient`]:
//! - [`HttpFetchClient`] issues direct GETs against the marketplace
//! - [`ProxyFetchClient`] routes requests through a scraping-proxy API
//!
//! Both share the bounded retry in [`retry`].

mod http;
mod proxy;
pub mod retry;

pub use http::HttpFetchClient;
pub use proxy::ProxyFetchClient;
pub use retry::{retry_with_backoff, RetryPolicy};

use crate::config::{FetchConfig, FetchMode};
use crate::ConfigError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// A fetched page: status code and body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for any 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// True for statuses worth another attempt (429 and 5xx)
    pub fn is_retriable_status(&self) -> bool {
        self.status == 429 || (500..600).contains(&self.status)
    }
}

/// Failures that prevent a response from being obtained at all
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

impl FetchError {
    /// Timeouts and connection failures are transient
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connect(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else if e.is_builder() {
            Self::InvalidUrl(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Capability to fetch a page by URL
///
/// Implementations must be shareable between workers. A non-2xx response is
/// not an error here; callers inspect [`FetchResponse::status`].
#[async_trait]
pub trait FetchClient: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// Builds the fetch client selected by the configuration
///
/// In proxy mode the API key is read from the environment variable named by
/// `fetch.proxy.api-key-env`.
pub fn build_fetch_client(config: &FetchConfig) -> Result<Arc<dyn FetchClient>, ConfigError> {
    let client: Arc<dyn FetchClient> = match config.mode {
        FetchMode::Direct => Arc::new(
            HttpFetchClient::new(config)
                .map_err(|e| ConfigError::Validation(e.to_string()))?,
        ),
        FetchMode::Proxy => {
            let proxy = config.proxy.as_ref().ok_or_else(|| {
                ConfigError::Validation("fetch mode 'proxy' requires [fetch.proxy]".to_string())
            })?;
            let api_key = std::env::var(&proxy.api_key_env)
                .map_err(|_| ConfigError::MissingEnv(proxy.api_key_env.clone()))?;
            Arc::new(
                ProxyFetchClient::new(config, proxy, api_key)
                    .map_err(|e| ConfigError::Validation(e.to_string()))?,
            )
        }
    };

    Ok(client)
}

/// Builds the shared reqwest client used by both fetchers
pub(crate) fn build_reqwest_client(config: &FetchConfig) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(std::time::Duration::from_secs(config.timeout_secs))
        .connect_timeout(std::time::Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(|e| FetchError::Build(e.to_string()))
}
