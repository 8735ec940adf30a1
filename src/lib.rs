//! Rank-Scout: keyword rank tracking for marketplace listings
//!
//! This crate finds where a product (or any of its variants) ranks in a
//! paginated search listing, using a rate-limited worker pool that resolves
//! variants, walks result pages and persists one outcome per tracked ASIN.

pub mod config;
pub mod fetch;
pub mod model;
pub mod output;
pub mod parse;
pub mod state;
pub mod storage;
pub mod tracker;

use thiserror::Error;

/// Main error type for Rank-Scout operations
#[derive(Debug, Error)]
pub enum RankError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid task: {0}")]
    InvalidTask(#[from] IdentifierError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Worker pool is already running")]
    AlreadyRunning,

    #[error("Worker {worker} failed: {message}")]
    Worker { worker: usize, message: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing environment variable: {0}")]
    MissingEnv(String),
}

/// Errors raised when a submission does not describe a valid task
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("ASIN must be 10 characters, got {0}")]
    Length(usize),

    #[error("ASIN must start with 'B': {0}")]
    Prefix(String),

    #[error("ASIN must be alphanumeric: {0}")]
    Charset(String),

    #[error("Keyword must be at least 2 characters: {0:?}")]
    Keyword(String),
}

/// Result type alias for Rank-Scout operations
pub type Result<T> = std::result::Result<T, RankError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{Asin, ListingEntry, PositionResult, StoredResult, Task, VariantSet};
pub use state::WorkerState;
pub use tracker::{RankService, SubmissionStatus};
