//! Scraping-proxy fetcher
//!
//! The target URL is handed to a proxy API as a query parameter together with
//! the API key and the geographic/rendering options; the proxy returns the
//! target's body with the target's status.

use crate::config::{FetchConfig, ProxyConfig};
use crate::fetch::retry::{retry_with_backoff, RetryPolicy};
use crate::fetch::{build_reqwest_client, FetchClient, FetchError, FetchResponse};
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

/// Fetches pages through a scraping-proxy endpoint
#[derive(Clone)]
pub struct ProxyFetchClient {
    client: Client,
    endpoint: Url,
    api_key: String,
    country_code: String,
    premium: bool,
    render_js: bool,
    /// Upstream deadline forwarded to the proxy, in milliseconds
    timeout_ms: u64,
    retry: RetryPolicy,
}

impl std::fmt::Debug for ProxyFetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyFetchClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .field("country_code", &self.country_code)
            .field("premium", &self.premium)
            .field("render_js", &self.render_js)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl ProxyFetchClient {
    pub fn new(
        config: &FetchConfig,
        proxy: &ProxyConfig,
        api_key: String,
    ) -> Result<Self, FetchError> {
        let endpoint = Url::parse(&proxy.endpoint)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", proxy.endpoint, e)))?;

        Ok(Self {
            client: build_reqwest_client(config)?,
            endpoint,
            api_key,
            country_code: proxy.country_code.clone(),
            premium: proxy.premium,
            render_js: proxy.render_js,
            timeout_ms: config.timeout_secs.saturating_mul(1000),
            retry: RetryPolicy::from_config(config),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Builds the proxy request URL for `target`
    pub fn request_url(&self, target: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .append_pair("url", target)
            .append_pair("country_code", &self.country_code)
            .append_pair("device_type", "desktop")
            .append_pair("render_js", if self.render_js { "1" } else { "0" })
            .append_pair("keep_headers", "true")
            .append_pair("premium", if self.premium { "true" } else { "false" })
            .append_pair("timeout", &self.timeout_ms.to_string());
        url
    }

    async fn fetch_once(&self, request_url: &Url) -> Result<FetchResponse, FetchError> {
        let response = self.client.get(request_url.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(FetchResponse { status, body })
    }
}

#[async_trait]
impl FetchClient for ProxyFetchClient {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let request_url = self.request_url(url);
        tracing::debug!("GET {} via proxy {}", url, self.endpoint);
        retry_with_backoff(self.retry, url, || self.fetch_once(&request_url)).await
    }
}
