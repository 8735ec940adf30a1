use crate::config::types::{Config, FetchConfig, FetchMode, OutputConfig, QueueConfig, SearchConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on the worker pool size
pub const MAX_WORKERS: usize = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_queue_config(&config.queue)?;
    validate_search_config(&config.search)?;
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates worker pool configuration
fn validate_queue_config(config: &QueueConfig) -> Result<(), ConfigError> {
    if config.worker_count < 1 || config.worker_count > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "worker_count must be between 1 and {}, got {}",
            MAX_WORKERS, config.worker_count
        )));
    }

    if config.requests_per_minute < 1 {
        return Err(ConfigError::Validation(format!(
            "requests_per_minute must be >= 1, got {}",
            config.requests_per_minute
        )));
    }

    Ok(())
}

/// Validates search configuration
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    validate_http_url("marketplace_url", &config.marketplace_url)?;

    if config.min_page_delay_ms > config.max_page_delay_ms {
        return Err(ConfigError::Validation(format!(
            "min_page_delay_ms ({}) must not exceed max_page_delay_ms ({})",
            config.min_page_delay_ms, config.max_page_delay_ms
        )));
    }

    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    match (config.mode, &config.proxy) {
        (FetchMode::Proxy, None) => Err(ConfigError::Validation(
            "fetch mode 'proxy' requires a [fetch.proxy] section".to_string(),
        )),
        (_, Some(proxy)) => {
            validate_http_url("proxy endpoint", &proxy.endpoint)?;
            if proxy.api_key_env.is_empty() {
                return Err(ConfigError::Validation(
                    "api_key_env cannot be empty".to_string(),
                ));
            }
            Ok(())
        }
        (FetchMode::Direct, None) => Ok(()),
    }
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Checks that `value` parses as an http(s) URL
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::ProxyConfig;

    #[test]
    fn test_validate_queue_bounds() {
        let mut config = QueueConfig::default();
        assert!(validate_queue_config(&config).is_ok());

        config.worker_count = 0;
        assert!(validate_queue_config(&config).is_err());

        config.worker_count = MAX_WORKERS + 1;
        assert!(validate_queue_config(&config).is_err());

        config.worker_count = 1;
        config.requests_per_minute = 0;
        assert!(validate_queue_config(&config).is_err());
    }

    #[test]
    fn test_validate_delay_bounds() {
        let mut config = SearchConfig::default();
        assert!(validate_search_config(&config).is_ok());

        config.min_page_delay_ms = 0;
        config.max_page_delay_ms = 0;
        assert!(validate_search_config(&config).is_ok());

        config.min_page_delay_ms = 10;
        assert!(validate_search_config(&config).is_err());
    }

    #[test]
    fn test_validate_marketplace_url() {
        let mut config = SearchConfig::default();
        config.marketplace_url = "ftp://example.com".to_string();
        assert!(matches!(
            validate_search_config(&config),
            Err(ConfigError::InvalidUrl(_))
        ));

        config.marketplace_url = "not a url".to_string();
        assert!(validate_search_config(&config).is_err());
    }

    #[test]
    fn test_proxy_mode_requires_proxy_section() {
        let mut config = FetchConfig::default();
        config.mode = FetchMode::Proxy;
        assert!(validate_fetch_config(&config).is_err());

        config.proxy = Some(ProxyConfig {
            endpoint: "https://api.scraperapi.com".to_string(),
            api_key_env: "SCRAPER_API_KEY".to_string(),
            country_code: "us".to_string(),
            premium: true,
            render_js: false,
        });
        assert!(validate_fetch_config(&config).is_ok());
    }
}
