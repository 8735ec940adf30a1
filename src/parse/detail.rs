//! Product detail parser

use crate::parse::DetailParser;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Inline script markers that identify variation data blobs
const VARIATION_MARKERS: [&str; 3] = [
    "dimensionValuesDisplayData",
    "dimensionToAsinMap",
    "asinVariationValues",
];

/// Identifier-shaped tokens inside script text, matched anywhere in the text
static ASIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"B[A-Z0-9]{9}").expect("valid ASIN regex"));
static SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("valid script selector"));
static DEFAULT_ASIN_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-defaultasin]").expect("valid selector"));
static PARENT_ASIN_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-parent-asin]").expect("valid selector"));

/// Extracts variant candidates from a product detail page
///
/// # Sources
///
/// 1. Inline `<script>` blocks mentioning one of the variation markers;
///    every token matching `B[A-Z0-9]{9}` is a candidate
/// 2. `data-defaultasin` attributes of the variant selectors
/// 3. The first `data-parent-asin` attribute on the page
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlDetailParser;

impl HtmlDetailParser {
    pub fn new() -> Self {
        Self
    }
}

impl DetailParser for HtmlDetailParser {
    fn parse_variants(&self, body: &str) -> BTreeSet<String> {
        let document = Html::parse_document(body);
        let mut candidates = BTreeSet::new();

        for script in document.select(&SCRIPT_SELECTOR) {
            let text: String = script.text().collect();
            if !VARIATION_MARKERS.iter().any(|marker| text.contains(marker)) {
                continue;
            }
            candidates.extend(ASIN_RE.find_iter(&text).map(|m| m.as_str().to_string()));
        }

        for element in document.select(&DEFAULT_ASIN_SELECTOR) {
            if let Some(value) = element.value().attr("data-defaultasin") {
                let value = value.trim();
                if !value.is_empty() {
                    candidates.insert(value.to_string());
                }
            }
        }

        let parent = document
            .select(&PARENT_ASIN_SELECTOR)
            .filter_map(|element| element.value().attr("data-parent-asin"))
            .map(str::trim)
            .find(|value| !value.is_empty());
        if let Some(parent) = parent {
            candidates.insert(parent.to_string());
        }

        candidates
    }
}
