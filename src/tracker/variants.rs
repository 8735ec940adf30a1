//! Variant discovery
//!
//! A product listed under one ASIN often ranks under a sibling (another size
//! or color) or its parent. The resolver reads the product detail page once
//! and returns every identifier it advertises, plus the input.

use crate::fetch::FetchClient;
use crate::model::{Asin, VariantSet};
use crate::parse::DetailParser;
use crate::tracker::urls::detail_url;
use std::sync::Arc;

/// Expands an ASIN into its variant set
#[derive(Clone)]
pub struct VariantResolver {
    fetch: Arc<dyn FetchClient>,
    parser: Arc<dyn DetailParser>,
    marketplace: String,
}

impl VariantResolver {
    pub fn new(
        fetch: Arc<dyn FetchClient>,
        parser: Arc<dyn DetailParser>,
        marketplace: impl Into<String>,
    ) -> Self {
        Self {
            fetch,
            parser,
            marketplace: marketplace.into(),
        }
    }

    /// Returns the variant set of `asin`; never fails
    ///
    /// The set always contains `asin`. Any fetch problem degrades to the
    /// singleton set.
    pub async fn resolve(&self, asin: &Asin) -> VariantSet {
        let mut variants = VariantSet::new();
        variants.insert(asin.clone());

        let url = match detail_url(&self.marketplace, asin) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(%asin, "Cannot build detail URL: {}", e);
                return variants;
            }
        };

        let response = match self.fetch.fetch(url.as_str()).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                tracing::warn!(%asin, status = response.status, "Detail page unavailable");
                return variants;
            }
            Err(e) => {
                tracing::warn!(%asin, "Detail page fetch failed: {}", e);
                return variants;
            }
        };

        let candidates = self.parser.parse_variants(&response.body);
        variants.extend(
            candidates
                .iter()
                .filter(|candidate| Asin::is_canonical(candidate))
                .filter_map(|candidate| Asin::parse(candidate).ok()),
        );

        tracing::debug!(%asin, variants = variants.len(), "Resolved variant set");
        variants
    }
}
