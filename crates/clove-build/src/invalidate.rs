//! Stale artifact removal for incremental compiles
//!
//! There is no manifest of which outputs came from which source. Outputs are
//! matched by name instead: everything in the mirrored output directory whose
//! stem starts with the source's stem is deleted. This also catches the extra
//! classes AOT emits per namespace (`core__init.class`, `core$fn__123.class`,
//! protocol interfaces under `core/`), and may delete unrelated outputs that
//! happen to share the prefix.

use crate::error::{BuildError, BuildResult};
use crate::namespace::{canonical_or_self, SourceRoots};
use crate::source_set::is_source_file;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Why a source file needs its outputs invalidated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Added or modified since the last run
    Outdated,
    /// Deleted since the last run
    Removed,
}

/// A source file whose derived outputs are stale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidationEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl InvalidationEvent {
    pub fn outdated(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: ChangeKind::Outdated,
        }
    }

    pub fn removed(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: ChangeKind::Removed,
        }
    }
}

/// Deletes outputs derived from changed or removed sources
pub struct Invalidator<'a> {
    roots: &'a SourceRoots,
    destination: &'a Path,
}

impl<'a> Invalidator<'a> {
    pub fn new(roots: &'a SourceRoots, destination: &'a Path) -> Self {
        Self { roots, destination }
    }

    /// Delete the outputs of one source file, returning what was deleted.
    ///
    /// Files that are not Clojure sources or do not live under a root are
    /// ignored.
    pub fn invalidate(&self, event: &InvalidationEvent) -> BuildResult<Vec<PathBuf>> {
        let file = canonical_file_path(&event.path);

        if !is_source_file(&file) || !self.roots.iter().any(|root| file.starts_with(root)) {
            debug!(path = %event.path.display(), "Ignoring non-source change");
            return Ok(Vec::new());
        }

        let root = self
            .roots
            .owning_root(&file)
            .ok_or_else(|| BuildError::no_source_root(&file))?;

        let relative = file
            .strip_prefix(root)
            .map_err(|_| BuildError::no_source_root(&file))?;
        let Some(base_name) = relative.file_stem().map(|s| s.to_string_lossy().into_owned())
        else {
            return Ok(Vec::new());
        };
        let output_dir = match relative.parent() {
            Some(parent) => self.destination.join(parent),
            None => self.destination.to_path_buf(),
        };

        let deleted = delete_prefixed(&output_dir, &base_name)?;
        debug!(
            path = %event.path.display(),
            kind = ?event.kind,
            deleted = deleted.len(),
            "Invalidated outputs"
        );
        Ok(deleted)
    }

    /// Invalidate every event, returning all deleted paths
    pub fn invalidate_all(&self, events: &[InvalidationEvent]) -> BuildResult<Vec<PathBuf>> {
        let mut deleted = Vec::new();
        for event in events {
            deleted.extend(self.invalidate(event)?);
        }
        Ok(deleted)
    }
}

/// Canonical form of a path whose file may no longer exist
fn canonical_file_path(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => canonical_or_self(parent).join(name),
        _ => path.to_path_buf(),
    }
}

/// Delete every entry directly in `dir` whose stem starts with `base_name`
fn delete_prefixed(dir: &Path, base_name: &str) -> BuildResult<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(BuildError::io(dir, e)),
    };

    let mut deleted = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BuildError::io(dir, e))?;
        let path = entry.path();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !stem.starts_with(base_name) {
            continue;
        }

        let file_type = entry.file_type().map_err(|e| BuildError::io(&path, e))?;
        if file_type.is_dir() {
            fs::remove_dir_all(&path).map_err(|e| BuildError::io(&path, e))?;
        } else {
            fs::remove_file(&path).map_err(|e| BuildError::io(&path, e))?;
        }
        debug!(path = %path.display(), "Deleted stale output");
        deleted.push(path);
    }

    deleted.sort();
    Ok(deleted)
}
