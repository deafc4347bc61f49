//! Build orchestration for a Clojure project
//!
//! The builder turns the loaded `clove.toml` into source sets and runs the
//! compile and test tasks over them: every source set is compiled in
//! configuration order (main first, test last), then the test set's
//! namespaces are run.

use crate::cache::BuildState;
use crate::compile::{CompileOutcome, CompileTask};
use crate::driver::{Interpreter, ProcessDriver};
use crate::error::BuildResult;
use crate::namespace::{find_namespaces, Namespace};
use crate::source_set::SourceSet;
use crate::test_runner::{TestOutcome, TestTask};
use crate::warnings::WarningTally;
use clove_config::{Config, ConfigLoader};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

/// Directory below the build dir for generated script files
pub const SCRATCH_DIR: &str = "tmp";

/// Per-invocation overrides on top of `clove.toml`
#[derive(Debug, Clone, Default)]
pub struct BuildConfig {
    /// Force AOT compilation on or off for every source set
    pub aot: Option<bool>,
    /// Ignore recorded state and compile everything
    pub force: bool,
    /// Write a JUnit report here instead of the configured path
    pub junit_report: Option<PathBuf>,
}

/// Build statistics
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Source sets compiled (including up-to-date ones)
    pub source_sets: usize,
    /// Namespaces across all compiled source sets
    pub namespaces: usize,
    /// Reflection warnings across all compiled source sets
    pub warnings: WarningTally,
    /// Total build time
    pub total_time: Duration,
}

/// Build context - result of a successful build
#[derive(Debug)]
pub struct BuildContext {
    pub compiled: Vec<CompileOutcome>,
    pub test: Option<TestOutcome>,
    pub stats: BuildStats,
}

/// Main builder for orchestrating builds
pub struct Builder {
    config: Config,
    build_config: BuildConfig,
    driver: ProcessDriver,
}

impl Builder {
    /// Create a builder for the project containing `project_path`
    pub fn new(project_path: impl AsRef<Path>) -> BuildResult<Self> {
        let config = ConfigLoader::new().load_from_directory(project_path.as_ref())?;
        Ok(Self::from_config(config))
    }

    /// Create a builder from an already loaded configuration
    pub fn from_config(config: Config) -> Self {
        let build_dir = config.resolve(&config.project.build_dir());
        let interpreter = config
            .project
            .interpreter
            .as_ref()
            .map(Interpreter::from_config)
            .unwrap_or_default();
        let driver = ProcessDriver::new(interpreter, build_dir.join(SCRATCH_DIR))
            .with_working_dir(config.project_root());

        Self {
            config,
            build_config: BuildConfig::default(),
            driver,
        }
    }

    /// Set build configuration
    pub fn with_config(mut self, build_config: BuildConfig) -> Self {
        self.build_config = build_config;
        self
    }

    /// Replace the interpreter launcher
    pub fn with_interpreter(mut self, interpreter: Interpreter) -> Self {
        self.driver = ProcessDriver::new(interpreter, self.scratch_dir())
            .with_working_dir(self.config.project_root());
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn build_dir(&self) -> PathBuf {
        self.config.resolve(&self.config.project.build_dir())
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.build_dir().join(SCRATCH_DIR)
    }

    /// Names of every source set, main first and test last
    pub fn source_set_names(&self) -> Vec<String> {
        self.config.project.source_set_names()
    }

    /// Resolve a source set, applying the AOT override
    pub fn source_set(&self, name: &str) -> BuildResult<SourceSet> {
        let mut layout = self.config.project.source_set(name)?;
        if let Some(aot) = self.build_config.aot {
            layout.compile.aot = Some(aot);
        }
        Ok(SourceSet::from_layout(&layout, &self.config))
    }

    /// Namespaces of a source set in compile order
    pub fn namespaces(&self, name: &str) -> BuildResult<Vec<Namespace>> {
        let set = self.source_set(name)?;
        find_namespaces(&set.discover()?, &set.roots)
    }

    /// Classpath for compiling or testing `set`.
    ///
    /// The test source set also sees every other set's entries, roots and
    /// output, so tests load the code under test.
    pub fn classpath(&self, set: &SourceSet) -> BuildResult<Vec<PathBuf>> {
        let mut classpath = set.classpath.clone();

        if set.name == self.config.project.test_source_set() {
            for name in self.source_set_names() {
                if name == set.name {
                    continue;
                }
                classpath.extend(self.source_set(&name)?.compile_classpath());
            }
        }

        classpath.extend(set.root_dirs.iter().cloned());
        classpath.push(set.output.clone());

        let mut seen = std::collections::HashSet::new();
        classpath.retain(|entry| seen.insert(entry.clone()));
        Ok(classpath)
    }

    /// Compile one source set
    pub fn compile(&self, name: &str) -> BuildResult<CompileOutcome> {
        let set = self.source_set(name)?;
        let state = BuildState::new(&self.build_dir(), &set.name);
        if self.build_config.force {
            state.clear()?;
        }

        CompileTask::new(&set, &self.driver)
            .with_classpath(self.classpath(&set)?)
            .with_state(state)
            .run()
    }

    /// Compile every source set in order
    pub fn compile_all(&self) -> BuildResult<Vec<CompileOutcome>> {
        self.source_set_names()
            .iter()
            .map(|name| self.compile(name))
            .collect()
    }

    /// Run the tests of the test source set
    pub fn test(&self) -> BuildResult<TestOutcome> {
        let set = self.source_set(self.config.project.test_source_set())?;
        let report = self
            .build_config
            .junit_report
            .clone()
            .or_else(|| self.config.project.junit_report().map(Path::to_path_buf))
            .map(|path| self.config.resolve(&path));

        TestTask::new(&set, &self.driver)
            .with_classpath(self.classpath(&set)?)
            .with_junit_report(report)
            .run()
    }

    /// Compile every source set, then run the tests
    pub fn check(&self) -> BuildResult<BuildContext> {
        let start = Instant::now();
        info!(
            project = self.config.project_name().unwrap_or("unnamed"),
            "Checking project"
        );

        let compiled = self.compile_all()?;
        let test = self.test()?;

        let stats = summarize(&compiled, start.elapsed());
        info!(
            "Check completed in {:.2}s",
            stats.total_time.as_secs_f64()
        );

        Ok(BuildContext {
            compiled,
            test: Some(test),
            stats,
        })
    }

    /// Compile every source set without testing
    pub fn build(&self) -> BuildResult<BuildContext> {
        let start = Instant::now();
        let compiled = self.compile_all()?;
        let stats = summarize(&compiled, start.elapsed());

        Ok(BuildContext {
            compiled,
            test: None,
            stats,
        })
    }
}

fn summarize(compiled: &[CompileOutcome], total_time: Duration) -> BuildStats {
    let mut stats = BuildStats {
        source_sets: compiled.len(),
        total_time,
        ..BuildStats::default()
    };
    for outcome in compiled {
        stats.namespaces += outcome.namespaces.len();
        stats.warnings.project += outcome.warnings.project;
        stats.warnings.library += outcome.warnings.library;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::CompileMode;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn project(toml: &str) -> (TempDir, Builder) {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("clove.toml"), toml).unwrap();
        let config = ConfigLoader::new()
            .without_env()
            .load_from_directory(temp.path())
            .unwrap();
        (temp, Builder::from_config(config))
    }

    #[test]
    fn test_main_classpath() {
        let (temp, builder) = project(
            r#"
[source-sets.main]
classpath = ["lib/clojure.jar"]
"#,
        );
        let main = builder.source_set("main").unwrap();

        assert_eq!(
            builder.classpath(&main).unwrap(),
            vec![
                temp.path().join("lib/clojure.jar"),
                temp.path().join("src/main/clojure"),
                temp.path().join("build/classes/main"),
            ]
        );
    }

    #[test]
    fn test_test_classpath_includes_other_sets() {
        let (temp, builder) = project(
            r#"
[source-sets.main]
classpath = ["lib/clojure.jar"]

[source-sets.test]
classpath = ["lib/test.check.jar"]
"#,
        );
        let test = builder.source_set("test").unwrap();

        assert_eq!(
            builder.classpath(&test).unwrap(),
            vec![
                temp.path().join("lib/test.check.jar"),
                temp.path().join("lib/clojure.jar"),
                temp.path().join("src/main/clojure"),
                temp.path().join("build/classes/main"),
                temp.path().join("src/test/clojure"),
                temp.path().join("build/classes/test"),
            ]
        );
    }

    #[test]
    fn test_aot_override() {
        let (_temp, builder) = project("[compile]\naot = false\n");
        let builder = builder.with_config(BuildConfig {
            aot: Some(true),
            ..BuildConfig::default()
        });

        assert!(builder.source_set("main").unwrap().options.ahead_of_time);
    }

    #[test]
    fn test_build_copies_all_source_sets() {
        let (temp, builder) = project("[project]\nname = \"basic-project\"\n");
        for (path, content) in [
            ("src/main/clojure/basic_project/core.clj", "(ns basic-project.core)"),
            ("src/test/clojure/basic_project/core_test.clj", "(ns basic-project.core-test)"),
        ] {
            let path = temp.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        let context = builder.build().unwrap();

        assert_eq!(context.stats.source_sets, 2);
        assert_eq!(context.stats.namespaces, 2);
        assert!(context
            .compiled
            .iter()
            .all(|outcome| outcome.mode == CompileMode::CopySource));
        assert!(temp
            .path()
            .join("build/classes/test/basic_project/core_test.clj")
            .exists());
        assert_eq!(
            builder.namespaces("main").unwrap(),
            vec![Namespace::from("basic-project.core")]
        );
    }

    #[test]
    fn test_scratch_dir_below_build_dir() {
        let (temp, builder) = project("[project]\nbuild-dir = \"out\"\n");
        assert_eq!(builder.scratch_dir(), temp.path().join("out/tmp"));
    }
}
