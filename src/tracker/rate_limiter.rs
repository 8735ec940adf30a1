//! Sliding-window admission control
//!
//! All workers share one limiter. An admission is only recorded when it fits
//! in the trailing window, and pruning, checking and recording happen under
//! one async lock, so two workers can never both take the last slot.

use crate::state::RateWindow;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Length of the default trailing window
pub const DEFAULT_RATE_WINDOW: Duration = Duration::from_secs(60);

/// Bounds outbound task starts to `limit` per trailing window
#[derive(Debug)]
pub struct RateLimiter {
    window: Mutex<RateWindow>,
}

impl RateLimiter {
    /// Creates a limiter admitting `per_minute` operations per 60 seconds
    pub fn per_minute(per_minute: usize) -> Self {
        Self::new(per_minute, DEFAULT_RATE_WINDOW)
    }

    /// Creates a limiter with an explicit window length
    pub fn new(limit: usize, period: Duration) -> Self {
        Self {
            window: Mutex::new(RateWindow::new(limit.max(1), period)),
        }
    }

    /// Suspends until one more admission fits, then records it
    ///
    /// Cancel-safe: an admission is only recorded on the path that returns.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut window = self.window.lock().await;
                let now = Instant::now();
                window.prune(now);

                match window.time_until_admit(now) {
                    None => {
                        window.record(now);
                        return;
                    }
                    Some(wait) => wait,
                }
            };

            tracing::debug!(wait_ms = wait.as_millis() as u64, "Rate window full, waiting");
            tokio::time::sleep(wait).await;
        }
    }

    /// Admissions currently inside the window
    pub async fn in_window(&self) -> usize {
        let mut window = self.window.lock().await;
        window.prune(Instant::now());
        window.len()
    }
}
