//! Crawl controller - the traversal state machine
//!
//! The controller owns the crawl state and drives the breadth-first walk:
//! - Dequeue an account and fetch its recent matches
//! - Queue every unseen match
//! - Drain the match queue, persisting body and timeline of each match and
//!   queueing every unseen participant account
//! - Repeat until the account frontier is empty, the crawl cap is hit, or a
//!   stop is requested
//!
//! Every fetch goes through the rate governor first. Nothing that happens to a
//! single item (failed fetch, bad payload, failed write) ends the crawl.

use crate::config::Config;
use crate::crawler::fetcher::{ApiClient, Endpoint, FetchResult};
use crate::crawler::governor::RateGovernor;
use crate::crawler::parser::{extract_ids, ACCOUNT_ID_MARKER, GAME_ID_MARKER};
use crate::output::{ProgressFeed, ProgressReporter};
use crate::state::{AccountId, CrawlPhase, CrawlState, MatchId, RateWindow};
use crate::storage::{
    load_existing, open_storage, ArtifactKind, ArtifactStore, FsArtifactStore, ResumeSummary,
};
use crate::CrawlError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Why a crawl reached `Completed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
    /// The matches-crawled counter reached `max-matches-to-crawl`
    CapReached,
    /// No account was left to process
    FrontierExhausted,
}

/// How a call to [`CrawlController::start`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlOutcome {
    Completed(CompletionReason),
    Stopped,
}

impl CrawlOutcome {
    fn phase(&self) -> CrawlPhase {
        match self {
            Self::Completed(_) => CrawlPhase::Completed,
            Self::Stopped => CrawlPhase::Stopped,
        }
    }
}

/// Cooperative stop signal for a running crawl
///
/// The controller checks it between accounts and after every match, never in
/// the middle of a fetch.
#[derive(Debug, Clone)]
pub struct StopHandle {
    signal: Arc<watch::Sender<bool>>,
    reporter: ProgressReporter,
}

impl StopHandle {
    /// Requests a stop; repeated calls are no-ops
    pub fn stop(&self) {
        if !self.signal.send_replace(true) {
            self.reporter.info("Stopping crawl...");
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self.signal.borrow()
    }
}

/// Main crawler controller structure
pub struct CrawlController<S: ArtifactStore = FsArtifactStore> {
    config: Arc<Config>,
    client: ApiClient,
    store: S,
    governor: RateGovernor,
    state: CrawlState,
    reporter: ProgressReporter,
    stop: StopHandle,
    stop_rx: watch::Receiver<bool>,
}

impl CrawlController<FsArtifactStore> {
    /// Creates a controller writing to the configured data directory
    ///
    /// The directory is created if it does not exist.
    ///
    /// # Returns
    ///
    /// * `Ok((CrawlController, ProgressFeed))` - Idle controller and its progress feed
    /// * `Err(CrawlError)` - Failed to open storage or build the HTTP client
    pub fn new(config: Config) -> Result<(Self, ProgressFeed), CrawlError> {
        let store = open_storage(Path::new(&config.output.data_directory))?;
        Self::with_store(config, store)
    }

    /// Switches to the artifacts in `directory` and rebuilds state from them
    ///
    /// Later writes go to the same directory.
    pub fn load_existing_from(
        &mut self,
        directory: impl Into<PathBuf>,
    ) -> Result<ResumeSummary, CrawlError> {
        self.ensure_idle()?;
        let store = FsArtifactStore::open_existing(directory)?;
        self.load_existing_with(store)
    }
}

impl<S: ArtifactStore> CrawlController<S> {
    /// Creates a controller over an arbitrary artifact store
    pub fn with_store(config: Config, store: S) -> Result<(Self, ProgressFeed), CrawlError> {
        let client = ApiClient::new(&config.api)?;
        let governor = RateGovernor::new(config.crawler.max_requests_per_minute);
        let state = CrawlState::new(
            AccountId::new(config.crawler.root_account_id.clone()),
            Instant::now(),
        );

        let (reporter, feed) = ProgressReporter::new();
        let (stop_tx, stop_rx) = watch::channel(false);
        let stop = StopHandle {
            signal: Arc::new(stop_tx),
            reporter: reporter.clone(),
        };

        Ok((
            Self {
                config: Arc::new(config),
                client,
                store,
                governor,
                state,
                reporter,
                stop,
                stop_rx,
            },
            feed,
        ))
    }

    /// Replaces the rate governor
    ///
    /// The governor built from the configuration admits
    /// `max-requests-per-minute` per 60-second window.
    pub fn with_governor(mut self, governor: RateGovernor) -> Self {
        self.governor = governor;
        self
    }

    /// Handle that can stop the crawl from another task
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Requests a cooperative stop
    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    pub fn phase(&self) -> CrawlPhase {
        self.state.phase()
    }

    pub fn matches_crawled(&self) -> u64 {
        self.state.matches_crawled
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replaces the current state with one rebuilt from the artifact store
    ///
    /// Complete matches are marked seen and counted as crawled, orphaned match
    /// bodies are deleted, and participants seed the account frontier. The root
    /// account is then discovered again so an empty directory still crawls.
    /// Only allowed before the crawl starts.
    pub fn load_existing(&mut self) -> Result<ResumeSummary, CrawlError> {
        self.ensure_idle()?;
        let (state, summary) = self.rebuild_state(&self.store)?;
        self.commit_resume(state, &summary);
        Ok(summary)
    }

    /// Like [`load_existing`](Self::load_existing), but over `store`
    ///
    /// The controller keeps its current store and state unless the rebuild
    /// succeeds; afterwards `store` receives all further writes.
    pub fn load_existing_with(&mut self, store: S) -> Result<ResumeSummary, CrawlError> {
        self.ensure_idle()?;
        let (state, summary) = self.rebuild_state(&store)?;
        self.store = store;
        self.commit_resume(state, &summary);
        Ok(summary)
    }

    fn rebuild_state(&self, store: &S) -> Result<(CrawlState, ResumeSummary), CrawlError> {
        self.reporter.info("Loading previously crawled data...");

        let mut state = CrawlState::empty(Instant::now());
        let summary = load_existing(store, &mut state, &self.reporter)?;

        let root = AccountId::new(self.config.crawler.root_account_id.clone());
        state.accounts.discover(root);

        Ok((state, summary))
    }

    fn commit_resume(&mut self, state: CrawlState, summary: &ResumeSummary) {
        self.state = state;
        self.reporter.set_crawled(self.state.matches_crawled);

        if summary.orphans_removed > 0 {
            self.reporter.warn(format!(
                "Removed {} incomplete matches from a previous run",
                summary.orphans_removed
            ));
        }
    }

    /// Runs the crawl until it completes or is stopped
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - The terminal state the crawl reached
    /// * `Err(CrawlError)` - The controller was not idle
    pub async fn start(&mut self) -> Result<CrawlOutcome, CrawlError> {
        self.transition(CrawlPhase::Running)?;
        self.state.rate = RateWindow::new(Instant::now());
        self.reporter.info("Starting crawl...");

        let started = Instant::now();
        let outcome = self.crawl().await;
        self.transition(outcome.phase())?;

        self.reporter.info(format!(
            "Crawl {}: {} matches crawled, {} accounts and {} matches seen in {:?}",
            self.state.phase(),
            self.state.matches_crawled,
            self.state.accounts.seen_len(),
            self.state.matches.seen_len(),
            started.elapsed()
        ));

        Ok(outcome)
    }

    async fn crawl(&mut self) -> CrawlOutcome {
        if self.cap_reached() {
            self.reporter
                .info("Reached max matches to crawl, nothing left to do.");
            return CrawlOutcome::Completed(CompletionReason::CapReached);
        }

        loop {
            if self.stop_requested() {
                return CrawlOutcome::Stopped;
            }
            self.tick();

            let account = match self.state.accounts.next() {
                Ok(account) => account,
                Err(e) => {
                    self.reporter.info(format!("{}, crawl complete", e));
                    return CrawlOutcome::Completed(CompletionReason::FrontierExhausted);
                }
            };

            let Some(recent) = self
                .gated_fetch(Endpoint::RecentMatches(account.clone()))
                .await
            else {
                continue;
            };

            match extract_ids(&recent, GAME_ID_MARKER) {
                Ok(ids) => {
                    for id in ids {
                        let match_id = MatchId::new(id);
                        if self.state.matches.discover(match_id.clone()) {
                            self.reporter.debug(format!(
                                "Adding match id: {} from account: {}",
                                match_id, account
                            ));
                        }
                    }
                }
                Err(e) => {
                    self.reporter.warn(format!(
                        "Could not extract matches of account {}: {}",
                        account, e
                    ));
                    continue;
                }
            }

            while let Ok(match_id) = self.state.matches.next() {
                if self.crawl_match(&match_id).await {
                    return CrawlOutcome::Completed(CompletionReason::CapReached);
                }
                if self.stop_requested() {
                    return CrawlOutcome::Stopped;
                }
            }
        }
    }

    /// Fetches and persists one match and its timeline
    ///
    /// Returns `true` once the crawl cap is reached.
    async fn crawl_match(&mut self, match_id: &MatchId) -> bool {
        let Some(body) = self.gated_fetch(Endpoint::Match(match_id.clone())).await else {
            return false;
        };

        if !self.persist(ArtifactKind::Match, match_id, &body) {
            return false;
        }

        match extract_ids(&body, ACCOUNT_ID_MARKER) {
            Ok(accounts) => {
                for id in accounts {
                    let account = AccountId::new(id);
                    if self.state.accounts.discover(account.clone()) {
                        self.reporter.debug(format!(
                            "Adding account id: {} from match: {}",
                            account, match_id
                        ));
                    }
                }
            }
            Err(e) => self.reporter.warn(format!(
                "Could not extract participants of match {}: {}",
                match_id, e
            )),
        }

        // Without a timeline the body stays on disk as an orphan for the next resume
        let Some(timeline) = self.gated_fetch(Endpoint::Timeline(match_id.clone())).await else {
            return false;
        };

        if !self.persist(ArtifactKind::Timeline, match_id, &timeline) {
            return false;
        }

        self.state.matches_crawled += 1;
        self.reporter.set_crawled(self.state.matches_crawled);

        if self.cap_reached() {
            self.reporter.info("Reached max matches to crawl, exiting.");
            return true;
        }
        false
    }

    fn persist(&self, kind: ArtifactKind, match_id: &MatchId, body: &str) -> bool {
        self.reporter
            .info(format!("Saving {} to {}.", kind, kind.file_name(match_id)));
        match self.store.save(kind, match_id, body) {
            Ok(()) => true,
            Err(e) => {
                self.reporter.error(format!(
                    "Failed to save {} of match {}: {}",
                    kind, match_id, e
                ));
                false
            }
        }
    }

    /// Waits for the rate governor, then issues one request
    ///
    /// Returns `None` for any failure; the caller skips the item.
    async fn gated_fetch(&mut self, endpoint: Endpoint) -> Option<String> {
        loop {
            let now = Instant::now();
            self.governor.window(&mut self.state.rate, now);
            match self.governor.before_request(&mut self.state.rate, now) {
                None => break,
                Some(wait) => {
                    self.reporter.info(format!(
                        "Reached limit, waiting {:.1} seconds.",
                        wait.as_secs_f64()
                    ));
                    self.reporter.info(format!(
                        "Crawled {} matches so far.",
                        self.state.matches_crawled
                    ));
                    tokio::time::sleep(wait).await;
                }
            }
        }

        self.reporter.debug(format!(
            "Fetching {} ({} requests left in window)",
            endpoint,
            self.governor.remaining(&self.state.rate)
        ));
        match self.client.fetch(&endpoint).await {
            success @ FetchResult::Success { status_code, .. } => {
                let body = success.into_body();
                if body.is_none() {
                    self.reporter.warn(format!(
                        "error downloading {}: empty body (HTTP {})",
                        endpoint, status_code
                    ));
                }
                body
            }
            FetchResult::HttpError { status_code } => {
                self.reporter
                    .warn(format!("error downloading {}: HTTP {}", endpoint, status_code));
                None
            }
            FetchResult::NetworkError { error } => {
                self.reporter
                    .warn(format!("error downloading {}: {}", endpoint, error));
                None
            }
        }
    }

    /// Clears a stale rate window even when no request is pending
    fn tick(&mut self) {
        self.governor.window(&mut self.state.rate, Instant::now());
    }

    fn cap_reached(&self) -> bool {
        self.state.matches_crawled >= self.config.crawler.max_matches_to_crawl
    }

    fn stop_requested(&self) -> bool {
        *self.stop_rx.borrow()
    }

    fn ensure_idle(&self) -> Result<(), CrawlError> {
        if self.state.phase() != CrawlPhase::Idle {
            return Err(CrawlError::InvalidTransition {
                from: self.state.phase(),
                to: CrawlPhase::Idle,
            });
        }
        Ok(())
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<(), CrawlError> {
        self.state
            .transition(next)
            .map_err(|(from, to)| CrawlError::InvalidTransition { from, to })
    }
}
