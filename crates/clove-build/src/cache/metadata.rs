//! Change detection and file state tracking for incremental builds

use crate::error::{BuildError, BuildResult};
use crate::invalidate::InvalidationEvent;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// File state snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileState {
    /// Last modified timestamp
    pub modified: SystemTime,
    /// File size in bytes
    pub size: u64,
    /// SHA-256 of the content, hex encoded
    pub hash: String,
}

/// Source file states keyed by absolute path
pub type Snapshot = BTreeMap<PathBuf, FileState>;

/// Result of comparing the current sources with the previous snapshot
#[derive(Debug, Clone, Default)]
pub struct Changes {
    /// Sources whose outputs are stale
    pub events: Vec<InvalidationEvent>,
    /// State to persist once the compile succeeds
    pub snapshot: Snapshot,
}

impl Changes {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Change detector compares source files against a previous snapshot
#[derive(Debug, Default)]
pub struct ChangeDetector {
    previous: Snapshot,
}

impl ChangeDetector {
    pub fn new(previous: Snapshot) -> Self {
        Self { previous }
    }

    /// Snapshot `files` and report which ones were added, modified or removed.
    ///
    /// Files whose timestamp and size are unchanged keep their previous hash
    /// without being read again.
    pub fn detect(&self, files: &[PathBuf]) -> BuildResult<Changes> {
        let mut changes = Changes::default();

        for path in files {
            let metadata = fs::metadata(path).map_err(|e| BuildError::io(path, e))?;
            let modified = metadata.modified().map_err(|e| BuildError::io(path, e))?;
            let size = metadata.len();

            let state = match self.previous.get(path) {
                Some(previous) if previous.modified == modified && previous.size == size => {
                    previous.clone()
                }
                previous => {
                    let hash = compute_file_hash(path)?;
                    if previous.map_or(true, |p| p.hash != hash) {
                        changes.events.push(InvalidationEvent::outdated(path));
                    }
                    FileState {
                        modified,
                        size,
                        hash,
                    }
                }
            };

            changes.snapshot.insert(path.clone(), state);
        }

        for path in self.previous.keys() {
            if !changes.snapshot.contains_key(path) {
                changes.events.push(InvalidationEvent::removed(path));
            }
        }

        Ok(changes)
    }
}

/// Compute SHA-256 hash of file content
pub fn compute_file_hash(path: &Path) -> BuildResult<String> {
    let content = fs::read(path).map_err(|e| BuildError::io(path, e))?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(format!("{:x}", hasher.finalize()))
}
