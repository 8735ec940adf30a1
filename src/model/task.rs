use crate::model::Asin;
use crate::IdentifierError;
use serde::Serialize;

/// Minimum keyword length accepted at the queue boundary
pub const MIN_KEYWORD_LEN: usize = 2;

/// A unit of work: find where `asin` ranks for `keyword`
///
/// Tasks are immutable once built; the only way to obtain one is through
/// [`Task::new`] or [`Task::parse`], which reject malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    asin: Asin,
    keyword: String,
}

impl Task {
    /// Builds a task from an already validated ASIN
    pub fn new(asin: Asin, keyword: &str) -> Result<Self, IdentifierError> {
        let keyword = keyword.trim();
        if keyword.chars().count() < MIN_KEYWORD_LEN {
            return Err(IdentifierError::Keyword(keyword.to_string()));
        }

        Ok(Self {
            asin,
            keyword: keyword.to_string(),
        })
    }

    /// Parses raw submission fields into a task
    pub fn parse(asin: &str, keyword: &str) -> Result<Self, IdentifierError> {
        Self::new(Asin::parse(asin)?, keyword)
    }

    pub fn asin(&self) -> &Asin {
        &self.asin
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }
}
