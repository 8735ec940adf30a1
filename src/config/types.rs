use serde::Deserialize;

/// Main configuration structure for Rank-Scout
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    pub output: OutputConfig,
}

/// Worker pool and rate budget configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct QueueConfig {
    /// Number of concurrent workers
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Maximum task admissions per trailing minute
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: usize,

    /// What happens to in-flight tasks when the pool is stopped
    #[serde(default)]
    pub stop_policy: StopPolicy,
}

/// Handling of tasks that are in flight when the pool stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopPolicy {
    /// Drop them without a stored result
    #[default]
    Abandon,

    /// Put them back at the front of the queue for the next start
    Redeliver,
}

/// Search walk configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SearchConfig {
    /// Marketplace origin used for search and detail pages
    #[serde(default = "default_marketplace_url")]
    pub marketplace_url: String,

    /// Lower bound of the courtesy delay between pages (milliseconds)
    #[serde(default = "default_min_page_delay_ms")]
    pub min_page_delay_ms: u64,

    /// Upper bound of the courtesy delay between pages (milliseconds, 0 disables)
    #[serde(default = "default_max_page_delay_ms")]
    pub max_page_delay_ms: u64,
}

/// How pages are fetched
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FetchConfig {
    #[serde(default)]
    pub mode: FetchMode,

    /// User agent for direct fetches
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra attempts after a transient failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay of the exponential backoff (milliseconds)
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Scraping proxy settings, required in proxy mode
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,
}

/// Fetch backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchMode {
    /// Plain HTTP GET against the marketplace
    #[default]
    Direct,

    /// Fetch through a scraping proxy API
    Proxy,
}

/// Scraping proxy API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProxyConfig {
    /// Proxy API endpoint
    pub endpoint: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Geographic origin requested from the proxy
    #[serde(default = "default_country_code")]
    pub country_code: String,

    #[serde(default)]
    pub premium: bool,

    #[serde(default)]
    pub render_js: bool,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the SQLite database file
    pub database_path: String,
}

fn default_worker_count() -> usize {
    10
}

fn default_requests_per_minute() -> usize {
    1000
}

fn default_marketplace_url() -> String {
    "https://www.amazon.com".to_string()
}

fn default_min_page_delay_ms() -> u64 {
    2000
}

fn default_max_page_delay_ms() -> u64 {
    5000
}

fn default_user_agent() -> String {
    format!("rank-scout/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    2
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_api_key_env() -> String {
    "SCRAPER_API_KEY".to_string()
}

fn default_country_code() -> String {
    "us".to_string()
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            requests_per_minute: default_requests_per_minute(),
            stop_policy: StopPolicy::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            marketplace_url: default_marketplace_url(),
            min_page_delay_ms: default_min_page_delay_ms(),
            max_page_delay_ms: default_max_page_delay_ms(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            mode: FetchMode::default(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            proxy: None,
        }
    }
}
