//! Fixed-window request governor
//!
//! Requests are counted inside a 60-second window. Once the count passes the
//! configured cap, the caller is told how long to sleep until the window ends.
//!
//! This is a fixed window, not a sliding one: a full burst at the end of one
//! window followed by another at the start of the next can briefly reach twice
//! the nominal rate. The upstream rate policy tolerates this.

use crate::state::RateWindow;
use std::time::{Duration, Instant};

/// Length of one request window
pub const WINDOW_LENGTH: Duration = Duration::from_secs(60);

/// Pure window arithmetic over a [`RateWindow`] owned by the crawl state
#[derive(Debug, Clone, Copy)]
pub struct RateGovernor {
    max_requests: u32,
    window_length: Duration,
}

impl RateGovernor {
    /// Creates a governor admitting `max_requests` per 60-second window
    pub fn new(max_requests: u32) -> Self {
        Self::with_window(max_requests, WINDOW_LENGTH)
    }

    /// Creates a governor with a custom window length
    pub fn with_window(max_requests: u32, window_length: Duration) -> Self {
        Self {
            max_requests,
            window_length,
        }
    }

    /// Resets the window once a full window length has elapsed
    ///
    /// Meant to be called on every controller step so a stale window is
    /// cleared even when no request is pending. Returns `true` on reset.
    pub fn window(&self, rate: &mut RateWindow, now: Instant) -> bool {
        if now.saturating_duration_since(rate.started_at) >= self.window_length {
            *rate = RateWindow::new(now);
            tracing::debug!("Resetting request count.");
            return true;
        }
        false
    }

    /// Counts one request and reports how long to wait before sending it
    ///
    /// Returns `None` while the window has room. Once the incremented count
    /// exceeds the cap, returns the time left until the window boundary.
    pub fn before_request(&self, rate: &mut RateWindow, now: Instant) -> Option<Duration> {
        rate.requests = rate.requests.saturating_add(1);

        if rate.requests <= self.max_requests {
            return None;
        }

        let elapsed = now.saturating_duration_since(rate.started_at);
        Some(self.window_length.saturating_sub(elapsed))
    }

    /// Requests still admitted in the current window
    pub fn remaining(&self, rate: &RateWindow) -> u32 {
        self.max_requests.saturating_sub(rate.requests)
    }
}
