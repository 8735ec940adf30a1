//! Storage module for persisting rank outcomes
//!
//! This module handles every result store operation, including:
//! - SQLite database initialization and schema management
//! - Upserting one outcome per tracked ASIN
//! - Aggregate statistics over stored outcomes

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{ResultStore, StorageError, StorageResult};

use crate::model::StoredResult;
use serde::Serialize;
use std::path::Path;

/// Opens or creates the SQLite store at `path`, creating missing parent
/// directories first
pub fn open_store(path: &Path) -> StorageResult<SqliteStore> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    SqliteStore::new(path)
}

/// Aggregate view over all stored results
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankStats {
    /// Number of stored results
    pub total: u64,

    /// Results where the product was found
    pub found: u64,

    /// Found results whose slot was sponsored
    pub sponsored: u64,

    /// Mean `total_position` over found results
    pub average_total_position: Option<f64>,
}

impl RankStats {
    /// Computes statistics from an iterator of results
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a StoredResult>) -> Self {
        let mut stats = Self::default();
        let mut position_sum = 0u64;
        let mut position_count = 0u64;

        for result in results {
            stats.total += 1;
            if !result.position.found {
                continue;
            }
            stats.found += 1;
            if result.position.sponsored == Some(true) {
                stats.sponsored += 1;
            }
            if let Some(total_position) = result.position.total_position {
                position_sum += u64::from(total_position);
                position_count += 1;
            }
        }

        if position_count > 0 {
            stats.average_total_position = Some(position_sum as f64 / position_count as f64);
        }
        stats
    }

    /// Organic (non-sponsored) found results
    pub fn organic(&self) -> u64 {
        self.found.saturating_sub(self.sponsored)
    }
}
