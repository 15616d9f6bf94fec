//! Crawler module for match and account traversal
//!
//! This module contains the core crawling logic, including:
//! - Fixed-window request rate limiting
//! - Authenticated HTTP fetching
//! - Permissive ID extraction from raw payloads
//! - The controller that drives the alternating breadth-first walk

mod controller;
mod fetcher;
mod governor;
mod parser;

pub use controller::{CompletionReason, CrawlController, CrawlOutcome, StopHandle};
pub use fetcher::{build_http_client, fetch_url, ApiClient, Endpoint, FetchResult};
pub use governor::{RateGovernor, WINDOW_LENGTH};
pub use parser::{extract_ids, MalformedDocument, ACCOUNT_ID_MARKER, GAME_ID_MARKER};

use crate::config::Config;
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the simplest entry point for a crawl. It will:
/// 1. Open the data directory
/// 2. Optionally rebuild state from the artifacts already there
/// 3. Crawl until the cap is reached or the account frontier runs dry
///
/// Progress lines still go to `tracing`; the progress feed is discarded.
///
/// # Example
///
/// ```no_run
/// use match_crawler::config::load_config;
/// use match_crawler::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let outcome = run_crawl(config, true).await?;
/// println!("{:?}", outcome);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, resume: bool) -> Result<CrawlOutcome, CrawlError> {
    let (mut controller, _feed) = CrawlController::new(config)?;
    if resume {
        controller.load_existing()?;
    }
    controller.start().await
}
