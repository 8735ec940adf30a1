use crate::model::{Asin, Task};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identifiers believed to denote the same underlying product
pub type VariantSet = BTreeSet<Asin>;

/// One product card on a search listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Raw identifier as found on the page
    pub asin: String,

    /// 1-based position within the page
    pub position: u32,

    /// Whether the slot was a paid placement
    pub sponsored: bool,
}

/// Outcome of a rank search
///
/// When `found` is false every positional field is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionResult {
    pub found: bool,
    pub matched_asin: Option<String>,
    pub page: Option<u32>,
    pub page_position: Option<u32>,
    pub total_position: Option<u32>,
    pub sponsored: Option<bool>,
}

impl PositionResult {
    /// A match at `page`, built from the matching entry and the running total
    pub fn found(page: u32, entry: &ListingEntry, total_position: u32) -> Self {
        Self {
            found: true,
            matched_asin: Some(entry.asin.clone()),
            page: Some(page),
            page_position: Some(entry.position),
            total_position: Some(total_position),
            sponsored: Some(entry.sponsored),
        }
    }

    pub fn not_found() -> Self {
        Self {
            found: false,
            matched_asin: None,
            page: None,
            page_position: None,
            total_position: None,
            sponsored: None,
        }
    }
}

/// A persisted rank outcome, keyed by `asin` alone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResult {
    pub asin: Asin,
    pub keyword: String,
    #[serde(flatten)]
    pub position: PositionResult,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredResult {
    /// Wraps a search outcome with the task that produced it
    pub fn new(task: &Task, position: PositionResult) -> Self {
        let now = Utc::now();
        Self {
            asin: task.asin().clone(),
            keyword: task.keyword().to_string(),
            position,
            created_at: now,
            updated_at: now,
        }
    }

    /// The safe default recorded when a task fails
    pub fn not_found(task: &Task) -> Self {
        Self::new(task, PositionResult::not_found())
    }
}
