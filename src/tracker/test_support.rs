//! Scripted collaborators for tracker tests

use crate::fetch::{FetchClient, FetchError, FetchResponse};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const MARKETPLACE: &str = "https://www.amazon.com";

#[derive(Clone)]
enum Scripted {
    Respond(FetchResponse),
    Fail,
}

/// Fetch client answering from a URL -> response table
///
/// Unscripted URLs answer 404 with an empty body.
#[derive(Default)]
pub struct ScriptedFetchClient {
    routes: Mutex<HashMap<String, Scripted>>,
    calls: AtomicUsize,
    log: Mutex<Vec<String>>,
}

impl ScriptedFetchClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, status: u16, body: &str) {
        self.routes.lock().unwrap().insert(
            url.to_string(),
            Scripted::Respond(FetchResponse::new(status, body)),
        );
    }

    pub fn fail(&self, url: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Scripted::Fail);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl FetchClient for ScriptedFetchClient {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(url.to_string());

        let scripted = self.routes.lock().unwrap().get(url).cloned();
        match scripted {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail) => Err(FetchError::Connect(format!("scripted failure: {}", url))),
            None => Ok(FetchResponse::new(404, "")),
        }
    }
}

/// `count` distinct filler ASINs for `page`
pub fn page_asins(page: u32, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("B{:03}{:06}", page, i)).collect()
}

/// A listing page with one card per ASIN; `sponsored` holds 0-based indexes
pub fn listing_page(asins: &[String], sponsored: &[usize]) -> String {
    let cards: String = asins
        .iter()
        .enumerate()
        .map(|(i, asin)| {
            let component = if sponsored.contains(&i) {
                "sp-sponsored-result"
            } else {
                "s-search-result"
            };
            format!(
                r#"<div data-asin="{}" data-component-type="{}"><h2><span>Item {}</span></h2></div>"#,
                asin, component, i
            )
        })
        .collect();

    format!(
        r#"<html><body><div class="s-main-slot"><div data-asin=""></div>{}</div></body></html>"#,
        cards
    )
}
