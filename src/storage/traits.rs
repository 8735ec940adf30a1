//! Storage traits and error types
//!
//! This module defines the trait interface for result stores and the
//! associated error types.

use crate::model::{Asin, StoredResult};
use crate::storage::RankStats;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt record for {asin}: {reason}")]
    Corrupt { asin: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for result store implementations
///
/// Results are keyed by ASIN alone. Implementations must be safe to share
/// between workers; `save` may be called concurrently for the same key.
pub trait ResultStore: Send + Sync {
    /// Inserts or replaces the result for `result.asin`
    ///
    /// Last write wins. An existing record keeps its `created_at`.
    fn save(&self, result: &StoredResult) -> StorageResult<()>;

    /// Gets the stored result for an ASIN, if any
    fn get(&self, asin: &Asin) -> StorageResult<Option<StoredResult>>;

    /// Aggregate counts over every stored result
    fn stats(&self) -> StorageResult<RankStats>;
}
