//! Output module for reporting tracking results
//!
//! This module handles:
//! - One JSON line per submission status
//! - Aggregate statistics reports

pub mod stats;

pub use stats::{format_statistics, load_statistics, print_statistics};

use crate::tracker::SubmissionStatus;

/// Serializes a status as a single JSON line
pub fn status_line(status: &SubmissionStatus) -> Result<String, serde_json::Error> {
    serde_json::to_string(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_is_single_line() {
        let status = SubmissionStatus::Pending {
            identifier: "B000000001".to_string(),
        };
        let line = status_line(&status).unwrap();

        assert!(!line.contains('\n'));
        assert_eq!(line, r#"{"status":"pending","identifier":"B000000001"}"#);
    }
}
