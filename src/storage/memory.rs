//! In-memory result store

use crate::model::{Asin, StoredResult};
use crate::storage::traits::{ResultStore, StorageError, StorageResult};
use crate::storage::RankStats;
use std::collections::HashMap;
use std::sync::Mutex;

/// Result store backed by a map; contents are lost on drop
#[derive(Debug, Default)]
pub struct MemoryStore {
    results: Mutex<HashMap<Asin, StoredResult>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored results
    pub fn len(&self) -> usize {
        self.results.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultStore for MemoryStore {
    fn save(&self, result: &StoredResult) -> StorageResult<()> {
        let mut results = self.results.lock().map_err(|_| StorageError::LockPoisoned)?;

        let mut record = result.clone();
        if let Some(existing) = results.get(&result.asin) {
            record.created_at = existing.created_at;
        }
        results.insert(record.asin.clone(), record);
        Ok(())
    }

    fn get(&self, asin: &Asin) -> StorageResult<Option<StoredResult>> {
        let results = self.results.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(results.get(asin).cloned())
    }

    fn stats(&self) -> StorageResult<RankStats> {
        let results = self.results.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(RankStats::from_results(results.values()))
    }
}
