//! Progress reporting for whatever shell drives the crawl
//!
//! Every message is emitted through `tracing` and also pushed as a timestamped
//! [`LogLine`] on an unbounded channel. The matches-crawled counter is published
//! on a watch channel so a consumer only ever sees the latest value. Neither
//! channel needs a live receiver; a dropped consumer never affects the crawl.

use chrono::{DateTime, Utc};
use std::fmt;
use tokio::sync::{mpsc, watch};

/// Severity of a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        };
        f.pad(s)
    }
}

/// A single human-readable progress message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub at: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:5} {}",
            self.at.format("%H:%M:%S"),
            self.level,
            self.message
        )
    }
}

/// Receiving side handed to the shell
#[derive(Debug)]
pub struct ProgressFeed {
    /// Log lines in emission order
    pub lines: mpsc::UnboundedReceiver<LogLine>,

    /// Latest matches-crawled count
    pub crawled: watch::Receiver<u64>,
}

impl ProgressFeed {
    /// Drains every line emitted so far without waiting
    pub fn drain_lines(&mut self) -> Vec<LogLine> {
        let mut lines = Vec::new();
        while let Ok(line) = self.lines.try_recv() {
            lines.push(line);
        }
        lines
    }
}

/// Sending side owned by the crawl controller
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    lines: mpsc::UnboundedSender<LogLine>,
    crawled: watch::Sender<u64>,
}

impl ProgressReporter {
    /// Creates a reporter and the feed that observes it
    pub fn new() -> (Self, ProgressFeed) {
        let (lines_tx, lines_rx) = mpsc::unbounded_channel();
        let (crawled_tx, crawled_rx) = watch::channel(0);

        (
            Self {
                lines: lines_tx,
                crawled: crawled_tx,
            },
            ProgressFeed {
                lines: lines_rx,
                crawled: crawled_rx,
            },
        )
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.emit(LogLevel::Debug, message.into());
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(LogLevel::Info, message.into());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.emit(LogLevel::Warn, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(LogLevel::Error, message.into());
    }

    /// Publishes the current matches-crawled count
    pub fn set_crawled(&self, count: u64) {
        self.crawled.send_replace(count);
    }

    fn emit(&self, level: LogLevel, message: String) {
        match level {
            LogLevel::Debug => tracing::debug!("{}", message),
            LogLevel::Info => tracing::info!("{}", message),
            LogLevel::Warn => tracing::warn!("{}", message),
            LogLevel::Error => tracing::error!("{}", message),
        }

        // A closed feed only means nobody is watching
        let _ = self.lines.send(LogLine {
            at: Utc::now(),
            level,
            message,
        });
    }
}
