//! Marketplace URL construction

use crate::model::Asin;
use url::{ParseError, Url};

/// Builds the search URL for `keyword` on `page`
///
/// The keyword is form-encoded (spaces become `+`). Page 1 carries no page
/// parameter.
///
/// # Example
///
/// ```
/// use rank_scout::tracker::search_url;
///
/// let url = search_url("https://www.amazon.com", "usb c cable", 2).unwrap();
/// assert_eq!(url.as_str(), "https://www.amazon.com/s?k=usb+c+cable&page=2");
/// ```
pub fn search_url(marketplace: &str, keyword: &str, page: u32) -> Result<Url, ParseError> {
    let mut url = Url::parse(marketplace)?.join("/s")?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("k", keyword);
        if page >= 2 {
            query.append_pair("page", &page.to_string());
        }
    }
    Ok(url)
}

/// Builds the product detail URL for `asin`
pub fn detail_url(marketplace: &str, asin: &Asin) -> Result<Url, ParseError> {
    Url::parse(marketplace)?.join(&format!("/dp/{}", asin))
}
