//! Bounded retry with exponential backoff
//!
//! A fetch outcome is retried when it is transient: a timeout or connection
//! failure, or a response with status 429 or 5xx. Anything else is returned
//! immediately. When the attempts run out the last outcome is returned as is,
//! so a persistent 503 still reaches the caller as a response.

use crate::config::FetchConfig;
use crate::fetch::{FetchError, FetchResponse};
use std::future::Future;
use std::time::Duration;

/// How many times, and how patiently, a fetch is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,

    /// Base delay; attempt `n` waits `base * 2^n`
    pub backoff_base: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_base: Duration) -> Self {
        Self {
            max_retries,
            backoff_base,
        }
    }

    /// A policy that never retries
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.backoff_base_ms),
        )
    }

    /// Delay before retry number `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(1u32 << attempt.min(31))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_secs(1))
    }
}

fn is_retriable(outcome: &Result<FetchResponse, FetchError>) -> bool {
    match outcome {
        Ok(response) => response.is_retriable_status(),
        Err(err) => err.is_transient(),
    }
}

/// Runs `operation` until it yields a non-transient outcome or the policy is
/// exhausted
///
/// # Backoff schedule (base = 1 s)
///
/// | Retry | Sleep before it |
/// |-------|-----------------|
/// | 1     | 1 s             |
/// | 2     | 2 s             |
/// | 3     | 4 s             |
///
/// With `max_retries = 2` the operation runs at most 3 times.
pub async fn retry_with_backoff<F, Fut>(
    policy: RetryPolicy,
    url: &str,
    mut operation: F,
) -> Result<FetchResponse, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<FetchResponse, FetchError>>,
{
    let mut attempt = 0u32;

    loop {
        let outcome = operation().await;
        if !is_retriable(&outcome) || attempt >= policy.max_retries {
            return outcome;
        }

        let delay = policy.delay_for(attempt);
        match &outcome {
            Ok(response) => tracing::warn!(
                url,
                attempt,
                status = response.status,
                delay_ms = delay.as_millis() as u64,
                "Retriable status, retrying after backoff"
            ),
            Err(err) => tracing::warn!(
                url,
                attempt,
                error = %err,
                delay_ms = delay.as_millis() as u64,
                "Transient fetch error, retrying after backoff"
            ),
        }

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
