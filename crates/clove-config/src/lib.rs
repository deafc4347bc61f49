//! Clove Configuration System
//!
//! Provides configuration management for Clove projects including:
//! - Project configuration (clove.toml)
//! - Source set layout (roots, output directories, classpaths)
//! - Compile, test and interpreter settings
//! - Environment variable overrides
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Built-in conventions (`src/<set>/clojure`, `build/classes/<set>`)
//! 2. Project config (./clove.toml)
//! 3. Environment variables (CLOVE_*)
//! 4. CLI flags
//!
//! # Example
//!
//! ```no_run
//! use clove_config::ConfigLoader;
//! use std::path::Path;
//!
//! let loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! ```

pub mod loader;
pub mod project;

use std::path::PathBuf;
use thiserror::Error;

/// Name of the project configuration file
pub const CONFIG_FILE_NAME: &str = "clove.toml";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Unknown source set '{0}'")]
    UnknownSourceSet(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use loader::{Config, ConfigLoader};
pub use project::{
    CompileConfig, InterpreterConfig, ProjectConfig, ProjectSection, ReflectionWarningsConfig,
    SourceSetConfig, SourceSetLayout, TestConfig, MAIN_SOURCE_SET, TEST_SOURCE_SET,
};
