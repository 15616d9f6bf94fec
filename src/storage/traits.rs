//! Storage traits and error types
//!
//! This module defines the trait interface for artifact backends and
//! associated error types.

use crate::state::MatchId;
use std::fmt;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Artifact not found: {kind} {id}")]
    NotFound { kind: ArtifactKind, id: MatchId },

    #[error("Invalid artifact id: {0}")]
    InvalidId(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// The two files written per crawled match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// The match body
    Match,
    /// The match timeline
    Timeline,
}

impl ArtifactKind {
    /// File name prefix for this kind
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Match => "Match",
            Self::Timeline => "Timeline",
        }
    }

    /// File name suffix shared by both kinds
    pub fn suffix(&self) -> &'static str {
        ".txt"
    }

    /// File name for the artifact of `id`, e.g. `Match555.txt`
    pub fn file_name(&self, id: &MatchId) -> String {
        format!("{}{}{}", self.prefix(), id, self.suffix())
    }

    /// Recovers the match ID from a file name of this kind
    pub fn parse_file_name(&self, name: &str) -> Option<MatchId> {
        let id = name
            .strip_prefix(self.prefix())?
            .strip_suffix(self.suffix())?;
        if id.is_empty() {
            return None;
        }
        Some(MatchId::new(id))
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Match => write!(f, "match"),
            Self::Timeline => write!(f, "timeline"),
        }
    }
}

/// Trait for artifact backend implementations
///
/// One artifact per (kind, match) pair. A match counts as fully crawled only
/// when both its match and timeline artifacts exist.
pub trait ArtifactStore {
    /// Writes `body` as the artifact of `kind` for `id`, replacing any previous one
    fn save(&self, kind: ArtifactKind, id: &MatchId, body: &str) -> StorageResult<()>;

    /// Reads the artifact of `kind` for `id`
    fn load(&self, kind: ArtifactKind, id: &MatchId) -> StorageResult<String>;

    /// Whether the artifact of `kind` for `id` exists
    fn exists(&self, kind: ArtifactKind, id: &MatchId) -> bool;

    /// Removes the artifact of `kind` for `id`
    fn delete(&self, kind: ArtifactKind, id: &MatchId) -> StorageResult<()>;

    /// Lists every match ID with an artifact of `kind`, sorted by ID
    fn list(&self, kind: ArtifactKind) -> StorageResult<Vec<MatchId>>;

    /// Size in bytes of the artifact of `kind` for `id`
    fn size(&self, kind: ArtifactKind, id: &MatchId) -> StorageResult<u64>;
}
