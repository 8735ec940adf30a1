//! Statistics over stored rank outcomes
//!
//! This module provides functionality for loading and displaying aggregate
//! statistics from a result store.

use crate::storage::{RankStats, ResultStore};
use crate::Result;
use std::fmt::Write;

/// Loads statistics from a result store
///
/// # Arguments
///
/// * `store` - The result store to query
///
/// # Returns
///
/// * `Ok(RankStats)` - Successfully loaded statistics
/// * `Err(RankError)` - Failed to query the store
pub fn load_statistics(store: &dyn ResultStore) -> Result<RankStats> {
    Ok(store.stats()?)
}

/// Renders statistics as a human-readable report
pub fn format_statistics(stats: &RankStats) -> String {
    let mut out = String::new();
    let missing = stats.total.saturating_sub(stats.found);
    let percent = |count: u64| {
        if stats.total > 0 {
            (count as f64 / stats.total as f64) * 100.0
        } else {
            0.0
        }
    };

    let _ = writeln!(out, "=== Rank Statistics ===\n");
    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Tracked products: {}", stats.total);
    let _ = writeln!(
        out,
        "  Found: {} ({:.1}%)",
        stats.found,
        percent(stats.found)
    );
    let _ = writeln!(
        out,
        "  Not found: {} ({:.1}%)",
        missing,
        percent(missing)
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "Placement:");
    let _ = writeln!(out, "  Organic: {}", stats.organic());
    let _ = writeln!(out, "  Sponsored: {}", stats.sponsored);
    match stats.average_total_position {
        Some(average) => {
            let _ = writeln!(out, "  Average position: {:.1}", average);
        }
        None => {
            let _ = writeln!(out, "  Average position: n/a");
        }
    }

    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &RankStats) {
    print!("{}", format_statistics(stats));
}
