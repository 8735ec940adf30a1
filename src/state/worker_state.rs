/// Worker lifecycle states
///
/// A worker cycles `Idle -> Dequeuing -> RateLimitWait -> Resolving ->
/// Searching -> Persisting -> Idle`, and leaves the cycle through
/// `Stopping -> Stopped`.
use std::fmt;

/// Represents what a single worker is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    // ===== Cycle States =====
    /// Between tasks
    Idle,

    /// Waiting for a task to appear in the queue
    Dequeuing,

    /// Holding a task, waiting for the rate window to admit it
    RateLimitWait,

    /// Discovering the variant set of the task's ASIN
    Resolving,

    /// Walking search result pages
    Searching,

    /// Writing the outcome to the result store
    Persisting,

    // ===== Shutdown States =====
    /// Shutdown observed, unwinding the current step
    Stopping,

    /// Worker loop has exited
    Stopped,
}

impl WorkerState {
    /// Returns true once the worker loop has exited
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Returns true if the worker currently owns a task
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::RateLimitWait | Self::Resolving | Self::Searching | Self::Persisting
        )
    }

    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: WorkerState) -> bool {
        use WorkerState::*;

        match (self, next) {
            (Stopped, _) => false,
            (Stopping, Stopped) => true,
            (Stopping, _) => false,
            (_, Stopping) => true,
            (Idle, Dequeuing) => true,
            (Dequeuing, RateLimitWait) => true,
            (RateLimitWait, Resolving) => true,
            (Resolving, Searching) => true,
            (Searching, Persisting) => true,
            (Persisting, Idle) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dequeuing => "dequeuing",
            Self::RateLimitWait => "rate_limit_wait",
            Self::Resolving => "resolving",
            Self::Searching => "searching",
            Self::Persisting => "persisting",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        }
    }

    /// Returns all worker states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Idle,
            Self::Dequeuing,
            Self::RateLimitWait,
            Self::Resolving,
            Self::Searching,
            Self::Persisting,
            Self::Stopping,
            Self::Stopped,
        ]
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
