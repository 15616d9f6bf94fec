//! Storage module for persisting crawl artifacts
//!
//! This module handles everything written to disk, including:
//! - One file per match body and one per match timeline
//! - Enumerating existing artifacts
//! - Rebuilding crawl state from a previous run's artifacts

mod filesystem;
mod resume;
mod traits;

pub use filesystem::FsArtifactStore;
pub use resume::{load_existing, ResumeSummary};
pub use traits::{ArtifactKind, ArtifactStore, StorageError, StorageResult};

use std::path::Path;

/// Opens (and creates if missing) the artifact directory
///
/// # Arguments
///
/// * `path` - Directory that holds the match and timeline files
///
/// # Returns
///
/// * `Ok(FsArtifactStore)` - Successfully opened store
/// * `Err(StorageError)` - The directory could not be created
pub fn open_storage(path: &Path) -> StorageResult<FsArtifactStore> {
    FsArtifactStore::new(path)
}
