//! Output module for reporting crawl progress and results
//!
//! This module handles:
//! - Streaming human-readable progress lines and the crawled counter to a shell
//! - Summarizing an artifact directory

mod reporter;
pub mod stats;

pub use reporter::{LogLevel, LogLine, ProgressFeed, ProgressReporter};
pub use stats::{load_statistics, print_statistics, ArtifactStatistics};
