use crate::model::StoredResult;
use serde::Serialize;

/// Answer to a submission or status query
///
/// Serializes as `{"status":"completed","result":{...}}` or
/// `{"status":"pending","identifier":"..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// A stored result already exists for the ASIN
    Completed { result: StoredResult },

    /// The task was queued
    Pending { identifier: String },
}

impl SubmissionStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn identifier(&self) -> &str {
        match self {
            Self::Completed { result } => result.asin.as_str(),
            Self::Pending { identifier } => identifier,
        }
    }
}
