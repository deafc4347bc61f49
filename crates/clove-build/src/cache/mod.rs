//! Persisted per-source-set build state
//!
//! Each source set keeps a JSON file under `<build-dir>/clove-state/` holding
//! the source snapshot of the last successful compile plus the inputs that
//! compile used. Changed inputs or an unreadable file mean a full rebuild.

pub mod metadata;

pub use metadata::{compute_file_hash, ChangeDetector, Changes, FileState, Snapshot};

use crate::error::{BuildError, BuildResult};
use crate::options::CompileOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory below the build dir holding state files
pub const STATE_DIR: &str = "clove-state";

/// Bumped whenever the state layout changes
const STATE_VERSION: u32 = 1;

/// Inputs that invalidate every output when they change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileInputs {
    pub options: CompileOptions,
    pub classpath: Vec<PathBuf>,
    pub destination: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    version: u32,
    inputs: CompileInputs,
    sources: Snapshot,
}

/// State file of one source set
#[derive(Debug, Clone)]
pub struct BuildState {
    path: PathBuf,
}

impl BuildState {
    pub fn new(build_dir: &Path, source_set: &str) -> Self {
        Self {
            path: build_dir.join(STATE_DIR).join(format!("{}.json", source_set)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the previous snapshot when it was taken with the same inputs.
    ///
    /// Returns `None` when there is no usable state, meaning a full build.
    pub fn load(&self, inputs: &CompileInputs) -> Option<Snapshot> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => {
                debug!(path = %self.path.display(), "No previous build state");
                return None;
            }
        };

        let state: StateFile = match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable build state");
                return None;
            }
        };

        if state.version != STATE_VERSION || &state.inputs != inputs {
            debug!(path = %self.path.display(), "Compile inputs changed, rebuilding");
            return None;
        }

        Some(state.sources)
    }

    /// Record the snapshot of a successful compile
    pub fn save(&self, inputs: &CompileInputs, sources: &Snapshot) -> BuildResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
        }

        let state = StateFile {
            version: STATE_VERSION,
            inputs: inputs.clone(),
            sources: sources.clone(),
        };
        let json = serde_json::to_string_pretty(&state)
            .map_err(|e| BuildError::StateError(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| BuildError::io(&self.path, e))?;
        Ok(())
    }

    /// Forget the state so the next compile is a full build
    pub fn clear(&self) -> BuildResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BuildError::io(&self.path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn inputs(aot: bool) -> CompileInputs {
        CompileInputs {
            options: if aot {
                CompileOptions::aot()
            } else {
                CompileOptions::default()
            },
            classpath: vec![PathBuf::from("/lib/clojure.jar")],
            destination: PathBuf::from("/build/classes/main"),
        }
    }

    fn sample_snapshot(dir: &Path) -> Snapshot {
        let file = dir.join("core.clj");
        fs::write(&file, "(ns core)").unwrap();
        ChangeDetector::default()
            .detect(&[file])
            .unwrap()
            .snapshot
    }

    #[test]
    fn test_state_path() {
        let state = BuildState::new(Path::new("/project/build"), "main");
        assert_eq!(
            state.path(),
            Path::new("/project/build/clove-state/main.json")
        );
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let snapshot = sample_snapshot(temp.path());
        let state = BuildState::new(&temp.path().join("build"), "main");

        assert!(state.load(&inputs(true)).is_none());
        state.save(&inputs(true), &snapshot).unwrap();
        assert_eq!(state.load(&inputs(true)), Some(snapshot));
    }

    #[test]
    fn test_changed_inputs_discard_state() {
        let temp = TempDir::new().unwrap();
        let snapshot = sample_snapshot(temp.path());
        let state = BuildState::new(&temp.path().join("build"), "main");

        state.save(&inputs(true), &snapshot).unwrap();
        assert!(state.load(&inputs(false)).is_none());
    }

    #[test]
    fn test_corrupt_state_discarded() {
        let temp = TempDir::new().unwrap();
        let state = BuildState::new(&temp.path().join("build"), "main");
        fs::create_dir_all(state.path().parent().unwrap()).unwrap();
        fs::write(state.path(), "{ not json").unwrap();

        assert!(state.load(&inputs(true)).is_none());
    }

    #[test]
    fn test_clear() {
        let temp = TempDir::new().unwrap();
        let state = BuildState::new(&temp.path().join("build"), "main");
        state.clear().unwrap();

        state.save(&inputs(true), &Snapshot::new()).unwrap();
        assert!(state.path().exists());
        state.clear().unwrap();
        assert!(!state.path().exists());
    }
}
