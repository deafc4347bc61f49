//! Project Configuration (clove.toml)
//!
//! Handles project-level configuration stored in `clove.toml` at the project root.
//! Every section is optional; missing values fall back to the conventional
//! `src/<set>/clojure` → `build/classes/<set>` layout.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Source set every project has, compiled first
pub const MAIN_SOURCE_SET: &str = "main";

/// Source set holding the tests, compiled last
pub const TEST_SOURCE_SET: &str = "test";

const DEFAULT_BUILD_DIR: &str = "build";

/// Project configuration from clove.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ProjectConfig {
    /// Project metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectSection>,

    /// Source sets keyed by name
    #[serde(default)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub source_sets: BTreeMap<String, SourceSetConfig>,

    /// Project-wide compile options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compile: Option<CompileConfig>,

    /// Test runner configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<TestConfig>,

    /// External interpreter configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<InterpreterConfig>,
}

/// `[project]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ProjectSection {
    /// Project name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Build directory (default: "build")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_dir: Option<PathBuf>,
}

/// `[source-sets.<name>]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct SourceSetConfig {
    /// Source roots (default: `src/<name>/clojure`)
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roots: Vec<PathBuf>,

    /// Destination directory (default: `<build-dir>/classes/<name>`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Extra classpath entries (jars, directories)
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classpath: Vec<PathBuf>,

    /// Compile options overriding the project-wide `[compile]` table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compile: Option<CompileConfig>,
}

/// `[compile]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct CompileConfig {
    /// Compile ahead of time to class files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aot: Option<bool>,

    /// Copy sources to the output directory (default: `!aot`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_source: Option<bool>,

    /// Disable locals clearing in generated code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_locals_clearing: Option<bool>,

    /// Metadata keys elided from compiled vars
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elide_meta: Option<Vec<String>>,

    /// Enable direct linking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direct_linking: Option<bool>,

    /// Reflection warning policy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflection_warnings: Option<ReflectionWarningsConfig>,
}

/// `[compile.reflection-warnings]` table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ReflectionWarningsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_errors: Option<bool>,
}

/// `[test]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct TestConfig {
    /// Write a JUnit XML report to this path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub junit_report: Option<PathBuf>,

    /// Source set whose namespaces are tested (default: "test")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_set: Option<String>,
}

/// `[interpreter]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct InterpreterConfig {
    /// Java launcher (default: "java")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<PathBuf>,

    /// Extra JVM arguments
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub jvm_args: Vec<String>,
}

/// A source set with every convention default filled in.
///
/// Paths are still relative to the project root.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSetLayout {
    pub name: String,
    pub roots: Vec<PathBuf>,
    pub output: PathBuf,
    pub classpath: Vec<PathBuf>,
    pub compile: CompileConfig,
}

impl CompileConfig {
    /// Merge another compile config into this one.
    /// Other config takes precedence for non-None values.
    pub fn merge(&mut self, other: &CompileConfig) {
        if other.aot.is_some() {
            self.aot = other.aot;
        }
        if other.copy_source.is_some() {
            self.copy_source = other.copy_source;
        }
        if other.disable_locals_clearing.is_some() {
            self.disable_locals_clearing = other.disable_locals_clearing;
        }
        if other.elide_meta.is_some() {
            self.elide_meta = other.elide_meta.clone();
        }
        if other.direct_linking.is_some() {
            self.direct_linking = other.direct_linking;
        }
        match (self.reflection_warnings.as_mut(), other.reflection_warnings) {
            (Some(mine), Some(theirs)) => mine.merge(&theirs),
            (None, Some(theirs)) => self.reflection_warnings = Some(theirs),
            _ => {}
        }
    }

    pub fn aot(&self) -> bool {
        self.aot.unwrap_or(false)
    }
}

impl ReflectionWarningsConfig {
    pub fn merge(&mut self, other: &ReflectionWarningsConfig) {
        if other.enabled.is_some() {
            self.enabled = other.enabled;
        }
        if other.project_only.is_some() {
            self.project_only = other.project_only;
        }
        if other.as_errors.is_some() {
            self.as_errors = other.as_errors;
        }
    }
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, set) in &self.source_sets {
            validate_source_set(name, set)?;
        }

        if let Some(compile) = &self.compile {
            validate_compile("compile", compile)?;
        }

        if let Some(test) = &self.test {
            if let Some(name) = &test.source_set {
                if !self.has_source_set(name) {
                    return Err(ConfigError::UnknownSourceSet(name.clone()));
                }
            }
        }

        if let Some(program) = self.interpreter.as_ref().and_then(|i| i.program.as_ref()) {
            if program.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "interpreter.program".to_string(),
                    reason: "program cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the project name, if present
    pub fn project_name(&self) -> Option<&str> {
        self.project.as_ref().and_then(|p| p.name.as_deref())
    }

    /// Build directory relative to the project root
    pub fn build_dir(&self) -> PathBuf {
        self.project
            .as_ref()
            .and_then(|p| p.build_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIR))
    }

    /// All source set names: `main` first, `test` last, configured sets in between
    pub fn source_set_names(&self) -> Vec<String> {
        let mut names = vec![MAIN_SOURCE_SET.to_string()];
        names.extend(
            self.source_sets
                .keys()
                .filter(|name| *name != MAIN_SOURCE_SET && *name != TEST_SOURCE_SET)
                .cloned(),
        );
        names.push(TEST_SOURCE_SET.to_string());
        names
    }

    pub fn has_source_set(&self, name: &str) -> bool {
        name == MAIN_SOURCE_SET || name == TEST_SOURCE_SET || self.source_sets.contains_key(name)
    }

    /// Resolve a source set, applying layout conventions and merging compile options
    pub fn source_set(&self, name: &str) -> ConfigResult<SourceSetLayout> {
        if !self.has_source_set(name) {
            return Err(ConfigError::UnknownSourceSet(name.to_string()));
        }

        let configured = self.source_sets.get(name).cloned().unwrap_or_default();

        let roots = if configured.roots.is_empty() {
            vec![PathBuf::from("src").join(name).join("clojure")]
        } else {
            configured.roots
        };

        let output = configured
            .output
            .unwrap_or_else(|| self.build_dir().join("classes").join(name));

        let mut compile = self.compile.clone().unwrap_or_default();
        if let Some(overrides) = &configured.compile {
            compile.merge(overrides);
        }

        Ok(SourceSetLayout {
            name: name.to_string(),
            roots,
            output,
            classpath: configured.classpath,
            compile,
        })
    }

    /// Source set whose namespaces the test runner executes
    pub fn test_source_set(&self) -> &str {
        self.test
            .as_ref()
            .and_then(|t| t.source_set.as_deref())
            .unwrap_or(TEST_SOURCE_SET)
    }

    pub fn junit_report(&self) -> Option<&Path> {
        self.test.as_ref().and_then(|t| t.junit_report.as_deref())
    }

    /// Merge another project config into this one
    /// Other config takes precedence for non-None values
    pub fn merge(&mut self, other: &ProjectConfig) {
        if other.project.is_some() {
            self.project = other.project.clone();
        }
        if !other.source_sets.is_empty() {
            self.source_sets.extend(other.source_sets.clone());
        }
        match (self.compile.as_mut(), other.compile.as_ref()) {
            (Some(mine), Some(theirs)) => mine.merge(theirs),
            (None, Some(theirs)) => self.compile = Some(theirs.clone()),
            _ => {}
        }
        if other.test.is_some() {
            self.test = other.test.clone();
        }
        if other.interpreter.is_some() {
            self.interpreter = other.interpreter.clone();
        }
    }
}

fn validate_source_set(name: &str, set: &SourceSetConfig) -> ConfigResult<()> {
    if name.is_empty() || name.contains(['/', '\\']) {
        return Err(ConfigError::InvalidValue {
            field: format!("source-sets.{}", name),
            reason: "source set name must be a non-empty single path segment".to_string(),
        });
    }

    if set.roots.iter().any(|root| root.as_os_str().is_empty()) {
        return Err(ConfigError::InvalidValue {
            field: format!("source-sets.{}.roots", name),
            reason: "source root cannot be empty".to_string(),
        });
    }

    if let Some(compile) = &set.compile {
        validate_compile(&format!("source-sets.{}.compile", name), compile)?;
    }

    Ok(())
}

fn validate_compile(table: &str, compile: &CompileConfig) -> ConfigResult<()> {
    if let Some(keys) = &compile.elide_meta {
        if let Some(bad) = keys
            .iter()
            .find(|k| k.is_empty() || k.chars().any(char::is_whitespace))
        {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.elide-meta", table),
                reason: format!("invalid metadata key '{}'", bad),
            });
        }
    }
    Ok(())
}
