//! Search listing parser

use crate::model::ListingEntry;
use crate::parse::ListingParser;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Marker carried by paid placements in `data-component-type`
const SPONSORED_MARKER: &str = "sp-sponsored";

static CARD_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-asin]").expect("valid card selector"));
static MARKER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-component-type]").expect("valid marker selector"));

/// Attribute-based listing parser
///
/// # Extraction Rules
///
/// - Every element with a non-empty `data-asin` attribute is a card, in
///   document order
/// - Positions run 1..n over the kept cards only
/// - A card is sponsored when it, or any element inside it, has a
///   `data-component-type` containing `sp-sponsored`
///
/// # Example
///
/// ```
/// use rank_scout::parse::{HtmlListingParser, ListingParser};
///
/// let html = r#"<div data-asin="B000000001"></div><div data-asin=""></div>"#;
/// let entries = HtmlListingParser::new().parse_listing(html);
/// assert_eq!(entries.len(), 1);
/// assert_eq!(entries[0].position, 1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlListingParser;

impl HtmlListingParser {
    pub fn new() -> Self {
        Self
    }
}

/// Checks the card and everything inside it for the paid-placement marker
fn is_sponsored(card: &ElementRef<'_>) -> bool {
    let marked = |element: &ElementRef<'_>| {
        element
            .value()
            .attr("data-component-type")
            .map(|value| value.contains(SPONSORED_MARKER))
            .unwrap_or(false)
    };

    marked(card) || card.select(&MARKER_SELECTOR).any(|e| marked(&e))
}

impl ListingParser for HtmlListingParser {
    fn parse_listing(&self, body: &str) -> Vec<ListingEntry> {
        let document = Html::parse_document(body);

        document
            .select(&CARD_SELECTOR)
            .filter_map(|card| {
                let asin = card.value().attr("data-asin")?.trim();
                if asin.is_empty() {
                    return None;
                }
                Some((asin.to_string(), is_sponsored(&card)))
            })
            .enumerate()
            .map(|(index, (asin, sponsored))| ListingEntry {
                asin,
                position: index as u32 + 1,
                sponsored,
            })
            .collect()
    }
}
