//! Configuration Loader
//!
//! Handles locating `clove.toml` and applying environment overrides.

use crate::project::{CompileConfig, InterpreterConfig, ProjectConfig, ReflectionWarningsConfig};
use crate::{ConfigResult, CONFIG_FILE_NAME};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader
///
/// Loads configuration with the following precedence:
/// 1. Project config (./clove.toml) - lowest priority
/// 2. Environment variables (CLOVE_*) - overrides project
/// 3. CLI flags - highest priority (handled by caller)
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Skip CLOVE_* environment overrides
    ignore_env: bool,
}

/// Loaded configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Project root directory (where clove.toml was found, or the start directory)
    pub project_root: PathBuf,

    /// Whether a clove.toml was found
    pub has_config_file: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { ignore_env: false }
    }

    /// Do not apply CLOVE_* environment overrides
    pub fn without_env(mut self) -> Self {
        self.ignore_env = true;
        self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find clove.toml. Without one, the
    /// conventional layout is used with `start_dir` as the project root.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<Config> {
        let (root, project, has_config_file) = match find_config_file(start_dir) {
            Some(config_path) => {
                let project = ProjectConfig::load_from_file(&config_path)?;
                let root = config_path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| start_dir.to_path_buf());
                (root, project, true)
            }
            None => (start_dir.to_path_buf(), ProjectConfig::default(), false),
        };

        self.finish(project, root, has_config_file)
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<Config> {
        let project = ProjectConfig::load_from_file(config_path)?;
        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        self.finish(project, root, true)
    }

    fn finish(
        &self,
        project: ProjectConfig,
        project_root: PathBuf,
        has_config_file: bool,
    ) -> ConfigResult<Config> {
        let project = if self.ignore_env {
            project
        } else {
            apply_env_overrides(project)
        };
        project.validate()?;

        Ok(Config {
            project,
            project_root,
            has_config_file,
        })
    }
}

/// Walk up from `start_dir` looking for clove.toml
fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Apply environment variable overrides to project config
///
/// - `CLOVE_AOT=true` sets `compile.aot`
/// - `CLOVE_REFLECTION_WARNINGS=true` sets `compile.reflection-warnings.enabled`
/// - `CLOVE_JAVA=/path/to/java` sets `interpreter.program`
fn apply_env_overrides(mut config: ProjectConfig) -> ProjectConfig {
    if let Ok(aot) = env::var("CLOVE_AOT") {
        config
            .compile
            .get_or_insert_with(CompileConfig::default)
            .aot = Some(parse_bool(&aot));
    }

    if let Ok(enabled) = env::var("CLOVE_REFLECTION_WARNINGS") {
        config
            .compile
            .get_or_insert_with(CompileConfig::default)
            .reflection_warnings
            .get_or_insert_with(ReflectionWarningsConfig::default)
            .enabled = Some(parse_bool(&enabled));
    }

    if let Ok(java) = env::var("CLOVE_JAVA") {
        if !java.is_empty() {
            config
                .interpreter
                .get_or_insert_with(InterpreterConfig::default)
                .program = Some(PathBuf::from(java));
        }
    }

    config
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

impl Config {
    /// Get the project root directory
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get the project name
    pub fn project_name(&self) -> Option<&str> {
        self.project.project_name()
    }

    /// Resolve a project-relative path against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn create_config_file(dir: &Path, content: &str) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, content).unwrap();
        config_path
    }

    #[test]
    fn test_find_config_in_parent() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(
            temp_dir.path(),
            r#"
[project]
name = "parent-project"
"#,
        );

        let sub_dir = temp_dir.path().join("src").join("main");
        fs::create_dir_all(&sub_dir).unwrap();

        let config = ConfigLoader::new()
            .without_env()
            .load_from_directory(&sub_dir)
            .unwrap();

        assert_eq!(config.project_name(), Some("parent-project"));
        assert_eq!(config.project_root(), temp_dir.path());
        assert!(config.has_config_file);
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigLoader::new()
            .without_env()
            .load_from_directory(temp_dir.path())
            .unwrap();

        assert_eq!(
            config.resolve(Path::new("build")),
            temp_dir.path().join("build")
        );
        assert_eq!(config.resolve(temp_dir.path()), temp_dir.path());
    }

    #[test]
    #[serial]
    fn test_env_override_aot() {
        env::set_var("CLOVE_AOT", "yes");
        let config = apply_env_overrides(ProjectConfig::default());
        env::remove_var("CLOVE_AOT");

        assert_eq!(config.compile.unwrap().aot, Some(true));
    }

    #[test]
    #[serial]
    fn test_env_override_reflection_warnings() {
        env::set_var("CLOVE_REFLECTION_WARNINGS", "1");
        let config = apply_env_overrides(ProjectConfig::default());
        env::remove_var("CLOVE_REFLECTION_WARNINGS");

        let warnings = config.compile.unwrap().reflection_warnings.unwrap();
        assert_eq!(warnings.enabled, Some(true));
        assert_eq!(warnings.project_only, None);
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("TRUE"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("nope"));
    }
}
