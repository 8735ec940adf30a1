//! Direct HTTP fetcher

use crate::config::FetchConfig;
use crate::fetch::retry::{retry_with_backoff, RetryPolicy};
use crate::fetch::{build_reqwest_client, FetchClient, FetchError, FetchResponse};
use async_trait::async_trait;
use reqwest::Client;

/// Fetches pages with a plain GET against the target URL
#[derive(Debug, Clone)]
pub struct HttpFetchClient {
    client: Client,
    retry: RetryPolicy,
}

impl HttpFetchClient {
    /// Builds a client with the configured user agent, timeouts and retry policy
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rank_scout::config::FetchConfig;
    /// use rank_scout::fetch::HttpFetchClient;
    ///
    /// let client = HttpFetchClient::new(&FetchConfig::default()).unwrap();
    /// ```
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_reqwest_client(config)?,
            retry: RetryPolicy::from_config(config),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn fetch_once(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(FetchResponse { status, body })
    }
}

#[async_trait]
impl FetchClient for HttpFetchClient {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        tracing::debug!("GET {}", url);
        retry_with_backoff(self.retry, url, || self.fetch_once(url)).await
    }
}
