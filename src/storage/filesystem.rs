//! Filesystem storage implementation
//!
//! One plain-text file per artifact, named `<Prefix><MatchId>.txt`, all in a
//! single data directory.

use crate::state::{EntityId, MatchId};
use crate::storage::traits::{ArtifactKind, ArtifactStore, StorageError, StorageResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory-backed artifact store
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// Opens a store rooted at `root`, creating the directory if needed
    ///
    /// # Returns
    ///
    /// * `Ok(FsArtifactStore)` - The directory exists and is usable
    /// * `Err(StorageError)` - The directory could not be created
    pub fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| io_error(&root, source))?;
        Ok(Self { root })
    }

    /// Opens a store over an existing directory without creating it
    pub fn open_existing(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(io_error(
                &root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            ));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the artifact of `kind` for `id`
    pub fn path_for(&self, kind: ArtifactKind, id: &MatchId) -> StorageResult<PathBuf> {
        let raw = id.as_str();
        if raw.is_empty() || raw.contains(['/', '\\']) || raw.contains("..") {
            return Err(StorageError::InvalidId(raw.to_string()));
        }
        Ok(self.root.join(kind.file_name(id)))
    }
}

impl ArtifactStore for FsArtifactStore {
    fn save(&self, kind: ArtifactKind, id: &MatchId, body: &str) -> StorageResult<()> {
        let path = self.path_for(kind, id)?;
        fs::write(&path, body).map_err(|source| io_error(&path, source))
    }

    fn load(&self, kind: ArtifactKind, id: &MatchId) -> StorageResult<String> {
        let path = self.path_for(kind, id)?;
        fs::read_to_string(&path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound {
                kind,
                id: id.clone(),
            },
            _ => io_error(&path, source),
        })
    }

    fn exists(&self, kind: ArtifactKind, id: &MatchId) -> bool {
        self.path_for(kind, id)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    fn delete(&self, kind: ArtifactKind, id: &MatchId) -> StorageResult<()> {
        let path = self.path_for(kind, id)?;
        fs::remove_file(&path).map_err(|source| io_error(&path, source))
    }

    fn list(&self, kind: ArtifactKind) -> StorageResult<Vec<MatchId>> {
        let entries = fs::read_dir(&self.root).map_err(|source| io_error(&self.root, source))?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| io_error(&self.root, source))?;
            if !entry.path().is_file() {
                continue;
            }
            let name = entry.file_name();
            if let Some(id) = name.to_str().and_then(|n| kind.parse_file_name(n)) {
                ids.push(id);
            }
        }

        ids.sort();
        Ok(ids)
    }

    fn size(&self, kind: ArtifactKind, id: &MatchId) -> StorageResult<u64> {
        let path = self.path_for(kind, id)?;
        fs::metadata(&path)
            .map(|meta| meta.len())
            .map_err(|source| io_error(&path, source))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}
