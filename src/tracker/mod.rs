//! Rank tracking engine
//!
//! This module contains the concurrent core of Rank-Scout:
//! - A shared sliding-window rate limiter
//! - A FIFO task queue with drain tracking
//! - Variant resolution from product detail pages
//! - The multi-page position search
//! - The worker pool and submission surface tying them together
//!
//! # Example
//!
//! ```no_run
//! use rank_scout::config::load_config;
//! use rank_scout::fetch::build_fetch_client;
//! use rank_scout::storage::SqliteStore;
//! use rank_scout::RankService;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config(Path::new("rank-scout.toml"))?;
//! let fetch = build_fetch_client(&config.fetch)?;
//! let store = Arc::new(SqliteStore::new(Path::new(&config.output.database_path))?);
//!
//! let service = RankService::from_config(&config, fetch, store);
//! service.start(config.queue.worker_count)?;
//! service.track("B0CRMZHDG8", "stanley cup")?;
//! service.wait_drained().await;
//! service.stop().await?;
//! # Ok(())
//! # }
//! ```

mod position;
mod queue;
mod rate_limiter;
mod service;
mod submission;
mod urls;
mod variants;

#[cfg(test)]
mod test_support;

pub use position::{PageDelay, PositionFinder, MAX_PAGES};
pub use queue::TaskQueue;
pub use rate_limiter::{RateLimiter, DEFAULT_RATE_WINDOW};
pub use service::{RankService, ServiceSettings};
pub use submission::SubmissionStatus;
pub use urls::{detail_url, search_url};
pub use variants::VariantResolver;
