pub mod check;
pub mod compile;
pub mod namespaces;
pub mod test;

use anyhow::{Context, Result};
use clove_build::{BuildConfig, Builder};
use clove_config::ConfigLoader;
use std::path::{Path, PathBuf};

/// Load the project around `project_dir` (default: current directory)
pub fn load_builder(project_dir: Option<&Path>, build_config: BuildConfig) -> Result<Builder> {
    let start = match project_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    let config = ConfigLoader::new()
        .load_from_directory(&start)
        .with_context(|| format!("Failed to load configuration from {}", start.display()))?;

    if !config.has_config_file {
        tracing::debug!(dir = %start.display(), "No clove.toml found, using the default layout");
    }

    Ok(Builder::from_config(config).with_config(build_config))
}

/// `--aot` only forces AOT on; without it clove.toml decides
pub fn aot_override(aot: bool) -> Option<bool> {
    aot.then_some(true)
}

/// Resolve a user supplied path against the current directory
pub fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Ok(cwd.join(path))
}
