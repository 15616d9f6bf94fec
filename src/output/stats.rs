//! Statistics over an artifact directory
//!
//! This module provides functionality for summarizing what a crawl has
//! written to disk, without touching the network.

use crate::storage::{ArtifactKind, ArtifactStore, StorageResult};
use std::collections::HashSet;

/// Artifact statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactStatistics {
    /// Matches with both body and timeline
    pub complete_matches: u64,

    /// Match bodies without a timeline (removed on the next resume)
    pub orphaned_matches: u64,

    /// Timelines without a match body
    pub stray_timelines: u64,

    /// Total size of all artifact files in bytes
    pub total_bytes: u64,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The artifact store to inspect
///
/// # Returns
///
/// * `Ok(ArtifactStatistics)` - Successfully computed statistics
/// * `Err(StorageError)` - The store could not be listed or inspected
pub fn load_statistics(store: &dyn ArtifactStore) -> StorageResult<ArtifactStatistics> {
    let matches = store.list(ArtifactKind::Match)?;
    let timelines: HashSet<_> = store.list(ArtifactKind::Timeline)?.into_iter().collect();

    let mut stats = ArtifactStatistics::default();

    for id in &matches {
        stats.total_bytes += store.size(ArtifactKind::Match, id)?;
        if timelines.contains(id) {
            stats.complete_matches += 1;
        } else {
            stats.orphaned_matches += 1;
        }
    }

    let match_set: HashSet<_> = matches.into_iter().collect();
    for id in &timelines {
        stats.total_bytes += store.size(ArtifactKind::Timeline, id)?;
        if !match_set.contains(id) {
            stats.stray_timelines += 1;
        }
    }

    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &ArtifactStatistics) {
    println!("=== Artifact Statistics ===\n");
    println!("Complete matches:  {}", stats.complete_matches);
    println!("Orphaned matches:  {}", stats.orphaned_matches);
    println!("Stray timelines:   {}", stats.stray_timelines);
    println!("Total size:        {}", format_bytes(stats.total_bytes));
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
