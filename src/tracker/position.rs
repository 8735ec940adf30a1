//! Multi-page rank search
//!
//! # Algorithm
//!
//! Pages 1..=[`MAX_PAGES`] are fetched strictly in order. Every listing entry
//! on a page that could be fetched bumps a running `total_position`; the first
//! entry whose ASIN is in the variant set wins. A page that fails (transport
//! error or non-2xx) is skipped and adds nothing to the total. Between pages a
//! randomized courtesy delay is slept.

use crate::fetch::FetchClient;
use crate::model::{Asin, PositionResult, VariantSet};
use crate::parse::ListingParser;
use crate::tracker::urls::search_url;
use crate::Result;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Maximum number of listing pages examined per search
pub const MAX_PAGES: u32 = 10;

/// Uniformly random pause between consecutive pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDelay {
    pub min: Duration,
    pub max: Duration,
}

impl PageDelay {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min: min.min(max),
            max,
        }
    }

    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self::new(Duration::from_millis(min_ms), Duration::from_millis(max_ms))
    }

    /// No pause at all
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn is_disabled(&self) -> bool {
        self.max.is_zero()
    }

    /// Picks the next pause; `None` when delays are disabled
    pub fn sample(&self) -> Option<Duration> {
        if self.is_disabled() {
            return None;
        }
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Some(Duration::from_millis(rand::rng().random_range(min..=max)))
    }
}

impl Default for PageDelay {
    fn default() -> Self {
        Self::from_millis(2000, 5000)
    }
}

/// Walks search result pages looking for any member of a variant set
#[derive(Clone)]
pub struct PositionFinder {
    fetch: Arc<dyn FetchClient>,
    parser: Arc<dyn ListingParser>,
    marketplace: String,
    delay: PageDelay,
}

impl PositionFinder {
    pub fn new(
        fetch: Arc<dyn FetchClient>,
        parser: Arc<dyn ListingParser>,
        marketplace: impl Into<String>,
        delay: PageDelay,
    ) -> Self {
        Self {
            fetch,
            parser,
            marketplace: marketplace.into(),
            delay,
        }
    }

    /// Finds where any ASIN of `variants` first appears for `keyword`
    ///
    /// # Returns
    ///
    /// * `Ok(PositionResult)` - Found at some page, or not found in
    ///   [`MAX_PAGES`] pages
    /// * `Err(RankError::UrlParse)` - The marketplace base cannot produce a
    ///   search URL
    pub async fn find(&self, keyword: &str, variants: &VariantSet) -> Result<PositionResult> {
        let mut total_position = 0u32;

        for page in 1..=MAX_PAGES {
            let url = search_url(&self.marketplace, keyword, page)?;

            match self.fetch.fetch(url.as_str()).await {
                Ok(response) if response.is_success() => {
                    let entries = self.parser.parse_listing(&response.body);
                    tracing::debug!(keyword, page, entries = entries.len(), "Listing page parsed");

                    for entry in &entries {
                        total_position += 1;
                        if is_variant(&entry.asin, variants) {
                            tracing::info!(
                                keyword,
                                page,
                                page_position = entry.position,
                                total_position,
                                sponsored = entry.sponsored,
                                "Found {}",
                                entry.asin
                            );
                            return Ok(PositionResult::found(page, entry, total_position));
                        }
                    }
                }
                Ok(response) => {
                    tracing::warn!(keyword, page, status = response.status, "Skipping listing page");
                }
                Err(e) => {
                    tracing::warn!(keyword, page, "Skipping listing page: {}", e);
                }
            }

            if page < MAX_PAGES {
                if let Some(pause) = self.delay.sample() {
                    tokio::time::sleep(pause).await;
                }
            }
        }

        tracing::info!(keyword, pages = MAX_PAGES, "Not found");
        Ok(PositionResult::not_found())
    }
}

fn is_variant(raw: &str, variants: &VariantSet) -> bool {
    Asin::parse(raw)
        .map(|asin| variants.contains(&asin))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::HtmlListingParser;
    use crate::tracker::test_support::{listing_page, page_asins, ScriptedFetchClient, MARKETPLACE};
    use crate::RankError;

    const KEYWORD: &str = "usb cable";

    fn finder(fetch: Arc<ScriptedFetchClient>, delay: PageDelay) -> PositionFinder {
        PositionFinder::new(fetch, Arc::new(HtmlListingParser::new()), MARKETPLACE, delay)
    }

    fn page_url(page: u32) -> String {
        search_url(MARKETPLACE, KEYWORD, page).unwrap().to_string()
    }

    fn variants(asins: &[&str]) -> VariantSet {
        asins.iter().map(|a| Asin::parse(a).unwrap()).collect()
    }

    #[test]
    fn test_page_delay_bounds() {
        let delay = PageDelay::from_millis(10, 20);
        for _ in 0..100 {
            let pause = delay.sample().unwrap();
            assert!(pause >= Duration::from_millis(10));
            assert!(pause <= Duration::from_millis(20));
        }
        assert!(PageDelay::none().sample().is_none());
        assert!(PageDelay::from_millis(0, 0).is_disabled());
    }

    #[tokio::test]
    async fn test_found_on_second_page() {
        let fetch = Arc::new(ScriptedFetchClient::new());
        for page in 1..=3 {
            let mut asins = page_asins(page, 20);
            if page == 2 {
                asins[4] = "B0TARGET01".to_string();
            }
            fetch.respond(&page_url(page), 200, &listing_page(&asins, &[]));
        }

        let result = finder(Arc::clone(&fetch), PageDelay::none())
            .find(KEYWORD, &variants(&["B0TARGET01"]))
            .await
            .unwrap();

        assert!(result.found);
        assert_eq!(result.matched_asin.as_deref(), Some("B0TARGET01"));
        assert_eq!(result.page, Some(2));
        assert_eq!(result.page_position, Some(5));
        assert_eq!(result.total_position, Some(25));
        assert_eq!(result.sponsored, Some(false));
        assert_eq!(fetch.calls(), 2);
    }

    #[tokio::test]
    async fn test_sibling_variant_counts_as_match() {
        let fetch = Arc::new(ScriptedFetchClient::new());
        let asins = vec!["B000000011".to_string(), "B0SIBLING1".to_string()];
        fetch.respond(&page_url(1), 200, &listing_page(&asins, &[1]));

        let result = finder(fetch, PageDelay::none())
            .find(KEYWORD, &variants(&["B0TARGET01", "B0SIBLING1"]))
            .await
            .unwrap();

        assert_eq!(result.matched_asin.as_deref(), Some("B0SIBLING1"));
        assert_eq!(result.total_position, Some(2));
        assert_eq!(result.sponsored, Some(true));
    }

    #[tokio::test]
    async fn test_absent_target_fetches_every_page() {
        let fetch = Arc::new(ScriptedFetchClient::new());
        for page in 1..=MAX_PAGES {
            fetch.respond(&page_url(page), 200, &listing_page(&page_asins(page, 20), &[]));
        }

        let result = finder(Arc::clone(&fetch), PageDelay::none())
            .find(KEYWORD, &variants(&["B0TARGET01"]))
            .await
            .unwrap();

        assert_eq!(result, PositionResult::not_found());
        assert_eq!(fetch.calls(), MAX_PAGES as usize);
    }

    #[tokio::test]
    async fn test_failed_page_is_skipped_without_counting() {
        let fetch = Arc::new(ScriptedFetchClient::new());
        for page in 1..=5 {
            let mut asins = page_asins(page, 20);
            if page == 4 {
                asins[2] = "B0TARGET01".to_string();
            }
            fetch.respond(&page_url(page), 200, &listing_page(&asins, &[]));
        }
        fetch.respond(&page_url(3), 503, "");

        let result = finder(Arc::clone(&fetch), PageDelay::none())
            .find(KEYWORD, &variants(&["B0TARGET01"]))
            .await
            .unwrap();

        assert_eq!(result.page, Some(4));
        assert_eq!(result.page_position, Some(3));
        assert_eq!(result.total_position, Some(43));

        // Pages are walked in order and the walk stops at the hit
        let expected: Vec<String> = (1..=4).map(page_url).collect();
        assert_eq!(fetch.requested(), expected);
    }

    #[tokio::test]
    async fn test_transport_failure_is_skipped() {
        let fetch = Arc::new(ScriptedFetchClient::new());
        fetch.fail(&page_url(1));
        fetch.respond(
            &page_url(2),
            200,
            &listing_page(&["B0TARGET01".to_string()], &[]),
        );

        let result = finder(fetch, PageDelay::none())
            .find(KEYWORD, &variants(&["B0TARGET01"]))
            .await
            .unwrap();

        assert_eq!(result.page, Some(2));
        assert_eq!(result.total_position, Some(1));
    }

    #[tokio::test]
    async fn test_bad_marketplace_is_an_error() {
        let fetch = Arc::new(ScriptedFetchClient::new());
        let finder = PositionFinder::new(
            fetch,
            Arc::new(HtmlListingParser::new()),
            "not a url",
            PageDelay::none(),
        );

        let result = finder.find(KEYWORD, &variants(&["B0TARGET01"])).await;
        assert!(matches!(result, Err(RankError::UrlParse(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_courtesy_delay_between_pages_only() {
        let fetch = Arc::new(ScriptedFetchClient::new());
        let started = tokio::time::Instant::now();

        let result = finder(Arc::clone(&fetch), PageDelay::from_millis(1000, 1000))
            .find(KEYWORD, &variants(&["B0TARGET01"]))
            .await
            .unwrap();

        assert!(!result.found);
        // Nine gaps between ten pages
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(9));
        assert!(elapsed < Duration::from_secs(10));
    }
}
