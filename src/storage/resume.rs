//! Rebuilding crawl state from artifacts already on disk
//!
//! A match is complete only when both its body and its timeline exist. Complete
//! matches are marked seen and their participants seed the account frontier.
//! A body without a timeline is left over from an interrupted run and is deleted
//! so the match gets fetched again.

use crate::crawler::{extract_ids, ACCOUNT_ID_MARKER};
use crate::output::ProgressReporter;
use crate::state::{AccountId, CrawlState};
use crate::storage::traits::{ArtifactKind, ArtifactStore, StorageResult};

/// What a resume found on disk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumeSummary {
    /// Complete matches marked seen
    pub matches_loaded: u64,

    /// Match bodies deleted for lacking a timeline
    pub orphans_removed: u64,

    /// Accounts newly queued from loaded match bodies
    pub accounts_seeded: u64,

    /// Complete matches whose body could not be scanned for participants
    pub malformed: u64,
}

/// Marks every complete match in `store` as seen and queues its participants
///
/// The caller decides what `state` starts as; existing entries are kept and
/// newly found IDs are added through the normal discovery gate. Every loaded
/// match counts towards `state.matches_crawled`.
///
/// # Errors
///
/// Fails only when the store cannot be listed. Per-file problems are logged
/// through `reporter` and skipped.
pub fn load_existing(
    store: &dyn ArtifactStore,
    state: &mut CrawlState,
    reporter: &ProgressReporter,
) -> StorageResult<ResumeSummary> {
    let mut summary = ResumeSummary::default();

    for match_id in store.list(ArtifactKind::Match)? {
        if !store.exists(ArtifactKind::Timeline, &match_id) {
            reporter.warn(format!(
                "File {} does not exist. Deleting match file.",
                ArtifactKind::Timeline.file_name(&match_id)
            ));
            match store.delete(ArtifactKind::Match, &match_id) {
                Ok(()) => summary.orphans_removed += 1,
                Err(e) => reporter.error(format!(
                    "Failed to delete orphaned match {}: {}",
                    match_id, e
                )),
            }
            continue;
        }

        let body = match store.load(ArtifactKind::Match, &match_id) {
            Ok(body) => body,
            Err(e) => {
                reporter.error(format!("Failed to read match {}: {}", match_id, e));
                continue;
            }
        };

        state.matches.mark_seen(match_id.clone());
        state.matches_crawled += 1;
        summary.matches_loaded += 1;

        match extract_ids(&body, ACCOUNT_ID_MARKER) {
            Ok(accounts) => {
                for account in accounts {
                    if state.accounts.discover(AccountId::new(account.clone())) {
                        reporter.debug(format!(
                            "Adding account id: {} from match: {}",
                            account, match_id
                        ));
                        summary.accounts_seeded += 1;
                    }
                }
            }
            Err(e) => {
                reporter.warn(format!(
                    "Could not extract participants from match {}: {}",
                    match_id, e
                ));
                summary.malformed += 1;
            }
        }
    }

    reporter.info(format!(
        "Loaded {} matches from file.",
        summary.matches_loaded
    ));

    Ok(summary)
}
