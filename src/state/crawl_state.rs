/// Aggregate state owned by the crawl controller
///
/// Nothing here is persisted between runs. A resumed crawl rebuilds this
/// structure from the artifacts already on disk.
use super::frontier::Frontier;
use super::ids::{AccountId, MatchId};
use std::fmt;
use std::time::Instant;

/// Lifecycle of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// State is initialized but no network or disk work has started
    Idle,

    /// The traversal loop is active
    Running,

    // ===== Terminal States =====
    /// The operator requested a stop
    Stopped,

    /// The crawl cap was reached or the account frontier ran dry
    Completed,
}

impl CrawlPhase {
    /// Checks whether moving from `self` to `next` is allowed
    ///
    /// Only `Idle -> Running` and `Running -> Stopped | Completed` exist.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Stopped)
                | (Self::Running, Self::Completed)
        )
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

/// Fixed request window tracked by the rate governor
#[derive(Debug, Clone, Copy)]
pub struct RateWindow {
    /// Requests counted since `started_at`
    pub requests: u32,

    /// When the current window opened
    pub started_at: Instant,
}

impl RateWindow {
    pub fn new(now: Instant) -> Self {
        Self {
            requests: 0,
            started_at: now,
        }
    }
}

/// Everything the traversal mutates during a run
#[derive(Debug, Clone)]
pub struct CrawlState {
    /// Accounts ever seen, and those waiting for their recent-matches list
    pub accounts: Frontier<AccountId>,

    /// Matches ever seen, and those waiting to be fetched
    pub matches: Frontier<MatchId>,

    /// Current request window
    pub rate: RateWindow,

    /// Matches with both body and timeline on disk
    pub matches_crawled: u64,

    phase: CrawlPhase,
}

impl CrawlState {
    /// Creates a fresh state whose only pending item is the root account
    pub fn new(root: AccountId, now: Instant) -> Self {
        Self {
            accounts: Frontier::seeded(root),
            matches: Frontier::new(),
            rate: RateWindow::new(now),
            matches_crawled: 0,
            phase: CrawlPhase::Idle,
        }
    }

    /// Creates a state with nothing seen or queued
    pub fn empty(now: Instant) -> Self {
        Self {
            accounts: Frontier::new(),
            matches: Frontier::new(),
            rate: RateWindow::new(now),
            matches_crawled: 0,
            phase: CrawlPhase::Idle,
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Moves to `next` if the transition is legal
    ///
    /// Returns the rejected `(from, to)` pair otherwise.
    pub fn transition(&mut self, next: CrawlPhase) -> Result<(), (CrawlPhase, CrawlPhase)> {
        if !self.phase.can_transition_to(next) {
            return Err((self.phase, next));
        }
        self.phase = next;
        Ok(())
    }
}
