//! Compile options for one compile invocation

use clove_config::CompileConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Reflection warning policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectionWarnings {
    /// Bind `*warn-on-reflection*` while compiling
    pub enabled: bool,
    /// Only report warnings for files under the project's own roots
    pub project_only: bool,
    /// Fail the compile when any project warning is reported
    pub as_errors: bool,
}

impl ReflectionWarnings {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    pub fn with_project_only(mut self, project_only: bool) -> Self {
        self.project_only = project_only;
        self
    }

    pub fn with_as_errors(mut self, as_errors: bool) -> Self {
        self.as_errors = as_errors;
        self
    }
}

/// Options for compiling a source set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Compile to class files instead of shipping sources
    pub ahead_of_time: bool,
    /// Copy sources to the destination; `None` means `!ahead_of_time`
    pub copy_source_to_output: Option<bool>,
    pub reflection_warnings: ReflectionWarnings,
    pub disable_locals_clearing: bool,
    /// Metadata keys elided from compiled vars
    pub elide_meta: BTreeSet<String>,
    pub direct_linking: bool,
}

impl CompileOptions {
    /// Build options from a merged `[compile]` table
    pub fn from_config(config: &CompileConfig) -> Self {
        let warnings = config.reflection_warnings.unwrap_or_default();
        Self {
            ahead_of_time: config.aot(),
            copy_source_to_output: config.copy_source,
            reflection_warnings: ReflectionWarnings {
                enabled: warnings.enabled.unwrap_or(false),
                project_only: warnings.project_only.unwrap_or(false),
                as_errors: warnings.as_errors.unwrap_or(false),
            },
            disable_locals_clearing: config.disable_locals_clearing.unwrap_or(false),
            elide_meta: config
                .elide_meta
                .iter()
                .flatten()
                .map(|key| key.trim_start_matches(':').to_string())
                .collect(),
            direct_linking: config.direct_linking.unwrap_or(false),
        }
    }

    pub fn aot() -> Self {
        Self {
            ahead_of_time: true,
            ..Self::default()
        }
    }

    /// Whether sources are copied to the destination instead of compiled
    pub fn copies_source(&self) -> bool {
        self.copy_source_to_output.unwrap_or(!self.ahead_of_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clove_config::ReflectionWarningsConfig;

    #[test]
    fn test_defaults_copy_source() {
        let options = CompileOptions::default();
        assert!(!options.ahead_of_time);
        assert!(options.copies_source());
        assert!(!options.reflection_warnings.enabled);
    }

    #[test]
    fn test_aot_does_not_copy_source() {
        assert!(!CompileOptions::aot().copies_source());
    }

    #[test]
    fn test_explicit_copy_source_wins() {
        let options = CompileOptions {
            copy_source_to_output: Some(false),
            ..CompileOptions::default()
        };
        assert!(!options.copies_source());
    }

    #[test]
    fn test_copy_source_config_overrides_aot() {
        let config = CompileConfig {
            aot: Some(true),
            copy_source: Some(true),
            ..Default::default()
        };

        let options = CompileOptions::from_config(&config);
        assert!(options.ahead_of_time);
        assert!(options.copies_source());
    }

    #[test]
    fn test_from_config() {
        let config = CompileConfig {
            aot: Some(true),
            elide_meta: Some(vec![":doc".to_string(), "file".to_string()]),
            direct_linking: Some(true),
            reflection_warnings: Some(ReflectionWarningsConfig {
                enabled: Some(true),
                as_errors: Some(true),
                project_only: None,
            }),
            ..Default::default()
        };

        let options = CompileOptions::from_config(&config);
        assert!(options.ahead_of_time);
        assert!(options.direct_linking);
        assert!(!options.disable_locals_clearing);
        assert_eq!(
            options.elide_meta.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["doc", "file"]
        );
        assert_eq!(
            options.reflection_warnings,
            ReflectionWarnings::enabled().with_as_errors(true)
        );
    }
}
