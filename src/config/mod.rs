//! Configuration module for arxiv-ripple
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so a missing section falls back to the values
//! the harvester was tuned with.
//!
//! # Example
//!
//! ```no_run
//! use arxiv_ripple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Page size: {}", config.crawler.page_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BatchConfig, ClientConfig, Config, CrawlerConfig, EndpointConfig, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
