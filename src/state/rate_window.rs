use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// Sliding record of admissions inside a trailing time window
///
/// This structure holds the state behind the rate limiter: an ordered list of
/// admission instants, oldest first. It is not synchronized; the limiter keeps
/// it behind a mutex.
#[derive(Debug, Clone)]
pub struct RateWindow {
    /// Maximum admissions allowed inside one window
    pub limit: usize,

    /// Length of the trailing window
    pub period: Duration,

    /// Admission instants, oldest at the front
    admissions: VecDeque<Instant>,
}

impl RateWindow {
    /// Creates an empty window admitting `limit` operations per `period`
    pub fn new(limit: usize, period: Duration) -> Self {
        Self {
            limit,
            period,
            admissions: VecDeque::with_capacity(limit.min(4096)),
        }
    }

    /// Drops admissions that have left the window as of `now`
    pub fn prune(&mut self, now: Instant) {
        while let Some(oldest) = self.admissions.front() {
            if now.duration_since(*oldest) >= self.period {
                self.admissions.pop_front();
            } else {
                break;
            }
        }
    }

    /// Checks if one more admission fits
    ///
    /// Only meaningful right after [`RateWindow::prune`].
    pub fn can_admit(&self) -> bool {
        self.admissions.len() < self.limit
    }

    /// Records an admission at `now`
    pub fn record(&mut self, now: Instant) {
        self.admissions.push_back(now);
    }

    /// Calculates how long until the oldest admission leaves the window
    ///
    /// Returns None if an admission can be made now.
    pub fn time_until_admit(&self, now: Instant) -> Option<Duration> {
        if self.can_admit() {
            return None;
        }

        self.admissions
            .front()
            .map(|oldest| self.period.saturating_sub(now.duration_since(*oldest)))
    }

    /// Number of admissions currently inside the window
    pub fn len(&self) -> usize {
        self.admissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.admissions.is_empty()
    }
}
