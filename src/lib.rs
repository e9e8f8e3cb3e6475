//! arxiv-ripple: a polite, resumable arXiv author harvester
//!
//! This crate crawls the arXiv Atom query API for a set of tracked authors,
//! keeps the entries whose author list fuzzily matches the tracked name,
//! and caches raw query pages and abstract pages on disk so that an
//! interrupted crawl can resume without repeating network work.

pub mod authors;
pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Main error type for arxiv-ripple operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP transport error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Fetch failed for {url} after {attempts} attempt(s): {source}")]
    FetchFailed {
        url: String,
        attempts: usize,
        source: Box<HarvestError>,
    },

    #[error("Request took {elapsed:?}, over the {limit:?} limit: {url}")]
    SlowFetch {
        url: String,
        elapsed: Duration,
        limit: Duration,
    },

    #[error("Crawl for {author} ran {elapsed:?}, over the {limit:?} budget")]
    BudgetExceeded {
        author: String,
        elapsed: Duration,
        limit: Duration,
    },

    #[error("Feed parse error: {0}")]
    FeedParse(String),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvestError {
    /// Returns true for failures the fetcher retries on its backoff schedule
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Status { .. })
    }

    /// Returns true if a per-request or per-run time budget was exceeded
    pub fn is_budget(&self) -> bool {
        matches!(self, Self::SlowFetch { .. } | Self::BudgetExceeded { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for arxiv-ripple operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use authors::{name_matches, MatchPolicy, TrackedAuthor};
pub use config::Config;
pub use crawler::{CrawlResult, Coordinator};
pub use state::Termination;
