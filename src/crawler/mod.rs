//! Crawler module for paginated author harvesting
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with identity rotation and retry logic
//! - Atom feed parsing
//! - Politeness pauses
//! - Per-author crawl coordination and the sequential batch driver

mod batch;
mod coordinator;
mod fetcher;
mod pacing;
mod parser;

pub use batch::{is_up_to_date, run_batch, BatchReport};
pub use coordinator::{Coordinator, CrawlResult};
pub use fetcher::{build_http_client, FetchRequest, Fetcher, HttpFetcher, RetryPolicy};
pub use pacing::{JitterWindow, Pacer, RecordingPacer, TokioPacer};
pub use parser::{parse_feed, FeedEntry, FeedPage, ParsedFeed};

use crate::authors::TrackedAuthor;
use crate::config::Config;
use crate::HarvestError;

/// Crawls a single author with the configured HTTP stack
///
/// This is the main entry point for single-author mode. It will:
/// 1. Build the HTTP client and coordinator from configuration
/// 2. Open the author's cache directories under `output.root-dir`
/// 3. Run the page loop to completion
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Crawl terminated normally
/// * `Err(HarvestError)` - Crawl aborted; cached artifacts are kept
pub async fn crawl(config: &Config, author: &TrackedAuthor) -> Result<CrawlResult, HarvestError> {
    let mut coordinator = Coordinator::from_config(config)?;
    coordinator.crawl_into(&config.output.root_dir, author).await
}
