//! Configuration module for Rank-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use rank_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("rank-scout.toml")).unwrap();
//! println!("Rate budget: {}/min", config.queue.requests_per_minute);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FetchConfig, FetchMode, OutputConfig, ProxyConfig, QueueConfig, SearchConfig,
    StopPolicy,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::MAX_WORKERS;
