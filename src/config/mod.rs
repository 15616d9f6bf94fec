//! Configuration module for Match-Crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use match_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawl starts from account {}", config.crawler.root_account_id);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, Config, CrawlerConfig, OutputConfig, DEFAULT_BASE_URL,
    DEFAULT_MAX_MATCHES_TO_CRAWL, DEFAULT_MAX_REQUESTS_PER_MINUTE,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
