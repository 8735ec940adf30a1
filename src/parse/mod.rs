//! HTML extraction
//!
//! This module turns fetched pages into the few facts the rank search needs:
//! - the ordered product cards of a search listing page
//! - the variant identifiers advertised on a product detail page
//!
//! Both are behind traits so the search and resolution logic can be driven by
//! scripted parsers in tests.

mod detail;
mod listing;

pub use detail::HtmlDetailParser;
pub use listing::HtmlListingParser;

use crate::model::ListingEntry;
use std::collections::BTreeSet;

/// Extracts product cards from a search listing page
pub trait ListingParser: Send + Sync {
    /// Returns the cards in page order with 1-based positions
    ///
    /// Never fails: an unrecognized page yields no entries.
    fn parse_listing(&self, body: &str) -> Vec<ListingEntry>;
}

/// Extracts candidate variant identifiers from a product detail page
pub trait DetailParser: Send + Sync {
    /// Returns raw candidates; the caller filters them into valid ASINs
    fn parse_variants(&self, body: &str) -> BTreeSet<String>;
}
