//! Integration tests for the rank tracker
//!
//! These tests use wiremock to stand in for the marketplace and drive the
//! real HTTP client, HTML parsers, SQLite store and worker pool end-to-end.

use rank_scout::config::{
    Config, FetchConfig, OutputConfig, ProxyConfig, QueueConfig, SearchConfig, StopPolicy,
};
use rank_scout::fetch::{FetchClient, HttpFetchClient, ProxyFetchClient};
use rank_scout::storage::{ResultStore, SqliteStore};
use rank_scout::{Asin, RankService, SubmissionStatus};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const KEYWORD: &str = "usb cable";

/// Matches search requests for one listing page (no `page` parameter = 1)
struct ListingPage(u32);

impl Match for ListingPage {
    fn matches(&self, request: &Request) -> bool {
        let page = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse::<u32>().ok())
            .unwrap_or(1);
        page == self.0
    }
}

/// Creates a test configuration pointing at the mock marketplace
fn create_test_config(marketplace: &str, db_path: &Path) -> Config {
    Config {
        queue: QueueConfig {
            worker_count: 2,
            requests_per_minute: 1000,
            stop_policy: StopPolicy::Abandon,
        },
        search: SearchConfig {
            marketplace_url: marketplace.to_string(),
            min_page_delay_ms: 0,
            max_page_delay_ms: 0, // No courtesy delay in tests
        },
        fetch: FetchConfig {
            timeout_secs: 5,
            max_retries: 1,
            backoff_base_ms: 1,
            ..FetchConfig::default()
        },
        output: OutputConfig {
            database_path: db_path.display().to_string(),
        },
    }
}

/// A listing page body with one card per ASIN
fn listing_html(asins: &[String], sponsored: &[usize]) -> String {
    let cards: String = asins
        .iter()
        .enumerate()
        .map(|(i, asin)| {
            let component = if sponsored.contains(&i) {
                "sp-sponsored-result"
            } else {
                "s-search-result"
            };
            format!(r#"<div data-asin="{}" data-component-type="{}"></div>"#, asin, component)
        })
        .collect();
    format!("<html><body>{}</body></html>", cards)
}

fn filler(page: u32, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("B{:03}{:06}", page, i)).collect()
}

async fn mount_listing(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/s"))
        .and(query_param("k", KEYWORD))
        .and(ListingPage(page))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn build_service(config: &Config, store: Arc<dyn ResultStore>) -> RankService {
    let fetch: Arc<dyn FetchClient> =
        Arc::new(HttpFetchClient::new(&config.fetch).expect("Failed to build HTTP client"));
    RankService::from_config(config, fetch, store)
}

async fn run_to_completion(service: &RankService, workers: usize) {
    service.start(workers).expect("Failed to start workers");
    tokio::time::timeout(Duration::from_secs(30), service.wait_drained())
        .await
        .expect("Queue did not drain");
    service.stop().await.expect("Failed to stop workers");
}

#[tokio::test]
async fn test_finds_sibling_variant_on_second_page() {
    let mock_server = MockServer::start().await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("rank.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    // Detail page advertises a sibling and a parent
    Mock::given(method("GET"))
        .and(path("/dp/B0TARGET01"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head><script>
                P.register("twister", { "dimensionToAsinMap": {"0": "B0TARGET01", "1": "B0SIBLING1"} });
            </script></head>
            <body><div id="dp" data-parent-asin="B0PARENT01"></div></body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    mount_listing(&mock_server, 1, listing_html(&filler(1, 20), &[])).await;

    let mut page_two = filler(2, 20);
    page_two[3] = "B0SIBLING1".to_string();
    mount_listing(&mock_server, 2, listing_html(&page_two, &[3])).await;

    let store = Arc::new(SqliteStore::new(&db_path).expect("Failed to open store"));
    let service = build_service(&config, store.clone());

    let status = service.track("B0TARGET01", KEYWORD).unwrap();
    assert!(!status.is_completed());
    run_to_completion(&service, 2).await;

    let asin = Asin::parse("B0TARGET01").unwrap();
    let stored = store.get(&asin).unwrap().expect("Result was not stored");
    assert!(stored.position.found);
    assert_eq!(stored.position.matched_asin.as_deref(), Some("B0SIBLING1"));
    assert_eq!(stored.position.page, Some(2));
    assert_eq!(stored.position.page_position, Some(4));
    assert_eq!(stored.position.total_position, Some(24));
    assert_eq!(stored.position.sponsored, Some(true));

    // Results survive a reopen of the database file
    drop(service);
    drop(store);
    let reopened = SqliteStore::new(&db_path).unwrap();
    assert!(reopened.get(&asin).unwrap().is_some());
}

#[tokio::test]
async fn test_absent_product_walks_all_pages() {
    let mock_server = MockServer::start().await;
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("rank.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&filler(9, 16), &[])))
        .expect(10)
        .mount(&mock_server)
        .await;

    let store = Arc::new(SqliteStore::new(&db_path).unwrap());
    let service = build_service(&config, store.clone());

    service.track("B0TARGET01", KEYWORD).unwrap();
    run_to_completion(&service, 1).await;

    let stored = store
        .get(&Asin::parse("B0TARGET01").unwrap())
        .unwrap()
        .unwrap();
    assert!(!stored.position.found);
    assert!(stored.position.page.is_none());
    assert!(stored.position.total_position.is_none());

    mock_server.verify().await;
}

#[tokio::test]
async fn test_transient_error_is_retried() {
    let mock_server = MockServer::start().await;
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("rank.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    // First attempt at page 1 fails, the retry succeeds
    Mock::given(method("GET"))
        .and(path("/s"))
        .and(ListingPage(1))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    let mut page_one = filler(1, 10);
    page_one[6] = "B0TARGET01".to_string();
    mount_listing(&mock_server, 1, listing_html(&page_one, &[])).await;

    let store = Arc::new(SqliteStore::new(&db_path).unwrap());
    let service = build_service(&config, store.clone());

    service.track("B0TARGET01", KEYWORD).unwrap();
    run_to_completion(&service, 1).await;

    let stored = store
        .get(&Asin::parse("B0TARGET01").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(stored.position.page, Some(1));
    assert_eq!(stored.position.page_position, Some(7));
    assert_eq!(stored.position.sponsored, Some(false));
}

#[tokio::test]
async fn test_failed_page_does_not_shift_positions() {
    let mock_server = MockServer::start().await;
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("rank.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    mount_listing(&mock_server, 1, listing_html(&filler(1, 20), &[])).await;
    mount_listing(&mock_server, 2, listing_html(&filler(2, 20), &[])).await;
    Mock::given(method("GET"))
        .and(path("/s"))
        .and(ListingPage(3))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    let mut page_four = filler(4, 20);
    page_four[0] = "B0TARGET01".to_string();
    mount_listing(&mock_server, 4, listing_html(&page_four, &[])).await;

    let store = Arc::new(SqliteStore::new(&db_path).unwrap());
    let service = build_service(&config, store.clone());

    service.track("B0TARGET01", KEYWORD).unwrap();
    run_to_completion(&service, 1).await;

    let stored = store
        .get(&Asin::parse("B0TARGET01").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(stored.position.page, Some(4));
    assert_eq!(stored.position.page_position, Some(1));
    assert_eq!(stored.position.total_position, Some(41));
}

#[tokio::test]
async fn test_duplicate_submissions_and_cached_answers() {
    let mock_server = MockServer::start().await;
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("rank.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    let mut page_one = filler(1, 5);
    page_one[1] = "B0TARGET01".to_string();
    mount_listing(&mock_server, 1, listing_html(&page_one, &[])).await;

    let store = Arc::new(SqliteStore::new(&db_path).unwrap());
    let service = build_service(&config, store.clone());

    service.track("B0TARGET01", KEYWORD).unwrap();
    service.track("b0target01", KEYWORD).unwrap();
    run_to_completion(&service, 2).await;

    let stats = store.stats().unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.found, 1);

    match service.track("B0TARGET01", KEYWORD).unwrap() {
        SubmissionStatus::Completed { result } => {
            assert_eq!(result.position.total_position, Some(2));
        }
        other => panic!("Expected a completed status, got {:?}", other),
    }
    assert!(service.queue().is_empty());
}

#[tokio::test]
async fn test_proxy_client_forwards_target() {
    let mock_server = MockServer::start().await;
    let target = "https://www.amazon.com/s?k=usb+cable&page=2";

    Mock::given(method("GET"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("url", target))
        .and(query_param("country_code", "us"))
        .and(query_param("device_type", "desktop"))
        .and(query_param("keep_headers", "true"))
        .and(query_param("timeout", "60000"))
        .respond_with(ResponseTemplate::new(200).set_body_string("proxied"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let proxy = ProxyConfig {
        endpoint: mock_server.uri(),
        api_key_env: "SCRAPER_API_KEY".to_string(),
        country_code: "us".to_string(),
        premium: true,
        render_js: false,
    };
    let client = ProxyFetchClient::new(&FetchConfig::default(), &proxy, "test-key".to_string())
        .expect("Failed to build proxy client");

    let response = client.fetch(target).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, "proxied");

    mock_server.verify().await;
}

#[tokio::test]
async fn test_http_client_reports_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dp/B000000001"))
        .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
        .mount(&mock_server)
        .await;

    let client = HttpFetchClient::new(&FetchConfig::default()).unwrap();
    let response = client
        .fetch(&format!("{}/dp/B000000001", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(response.status, 404);
    assert!(!response.is_success());
}
