//! Compile task for one source set
//!
//! A run discovers the sources, invalidates outputs of changed or removed
//! files, and then either copies the sources into the output directory or
//! AOT compiles every namespace in a single interpreter process.

use crate::cache::{BuildState, ChangeDetector, CompileInputs};
use crate::decoder::{ConsoleSink, LineHandler};
use crate::driver::ProcessDriver;
use crate::error::{BuildError, BuildResult};
use crate::invalidate::Invalidator;
use crate::namespace::{find_namespaces, Namespace};
use crate::script::compile_script;
use crate::source_set::SourceSet;
use crate::warnings::{WarningClassifier, WarningTally};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What a compile run did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompileMode {
    /// Sources copied verbatim to the output directory
    CopySource,
    /// Namespaces compiled to class files
    AheadOfTime,
    /// Nothing changed since the last successful run
    UpToDate,
}

/// Result of compiling a source set
#[derive(Debug, Clone, Serialize)]
pub struct CompileOutcome {
    pub source_set: String,
    pub mode: CompileMode,
    pub namespaces: Vec<Namespace>,
    /// Outputs deleted by invalidation
    pub invalidated: usize,
    /// Files written in copy mode
    pub copied: usize,
    pub warnings: WarningTally,
}

/// Compiles one source set
pub struct CompileTask<'a> {
    source_set: &'a SourceSet,
    driver: &'a ProcessDriver,
    classpath: Vec<PathBuf>,
    state: Option<BuildState>,
}

impl<'a> CompileTask<'a> {
    pub fn new(source_set: &'a SourceSet, driver: &'a ProcessDriver) -> Self {
        Self {
            source_set,
            driver,
            classpath: source_set.compile_classpath(),
            state: None,
        }
    }

    /// Replace the default classpath (set entries, roots, output)
    pub fn with_classpath(mut self, classpath: Vec<PathBuf>) -> Self {
        self.classpath = classpath;
        self
    }

    /// Track sources between runs so unchanged sets are skipped
    pub fn with_state(mut self, state: BuildState) -> Self {
        self.state = Some(state);
        self
    }

    /// Compile, forwarding interpreter output to this process's console
    pub fn run(&self) -> BuildResult<CompileOutcome> {
        self.run_with(ConsoleSink::Stdout, ConsoleSink::Stderr)
    }

    /// Compile, forwarding interpreter output to the given handlers
    pub fn run_with<O, E>(&self, stdout: O, stderr: E) -> BuildResult<CompileOutcome>
    where
        O: LineHandler + Send,
        E: LineHandler + Send,
    {
        let set = self.source_set;
        info!(source_set = %set.name, "Starting compile");

        let files = set.discover()?;
        let inputs = CompileInputs {
            options: set.options.clone(),
            classpath: self.classpath.clone(),
            destination: set.output.clone(),
        };

        let previous = self.state.as_ref().and_then(|state| state.load(&inputs));
        let has_previous = previous.is_some();
        let changes = ChangeDetector::new(previous.unwrap_or_default()).detect(&files)?;

        let namespaces = find_namespaces(&files, &set.roots)?;

        if has_previous && changes.is_empty() && set.output.is_dir() {
            info!(source_set = %set.name, "Up to date");
            return Ok(CompileOutcome {
                source_set: set.name.clone(),
                mode: CompileMode::UpToDate,
                namespaces,
                invalidated: 0,
                copied: 0,
                warnings: WarningTally::default(),
            });
        }

        // Outputs are about to change; until this run succeeds the recorded
        // snapshot no longer describes them.
        if !changes.is_empty() {
            if let Some(state) = &self.state {
                state.clear()?;
            }
        }

        let invalidated = Invalidator::new(&set.roots, &set.output)
            .invalidate_all(&changes.events)?
            .len();

        let mut outcome = CompileOutcome {
            source_set: set.name.clone(),
            mode: CompileMode::CopySource,
            namespaces,
            invalidated,
            copied: 0,
            warnings: WarningTally::default(),
        };

        if set.options.copies_source() {
            outcome.copied = self.copy_sources(&files)?;
        } else {
            outcome.mode = CompileMode::AheadOfTime;
            outcome.warnings = self.compile_namespaces(&outcome.namespaces, stdout, stderr)?;
        }

        if let Some(state) = &self.state {
            state.save(&inputs, &changes.snapshot)?;
        }

        Ok(outcome)
    }

    /// Copy every source to the same relative path below the output directory
    fn copy_sources(&self, files: &[PathBuf]) -> BuildResult<usize> {
        let set = self.source_set;
        for file in files {
            let relative = set
                .roots
                .owning_root(file)
                .and_then(|root| file.strip_prefix(root).ok())
                .ok_or_else(|| BuildError::no_source_root(file))?;
            let target = set.output.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
            }
            fs::copy(file, &target).map_err(|e| BuildError::io(&target, e))?;
            debug!(from = %file.display(), to = %target.display(), "Copied source");
        }
        info!(source_set = %set.name, files = files.len(), "Copied sources");
        Ok(files.len())
    }

    fn compile_namespaces<O, E>(
        &self,
        namespaces: &[Namespace],
        stdout: O,
        stderr: E,
    ) -> BuildResult<WarningTally>
    where
        O: LineHandler + Send,
        E: LineHandler + Send,
    {
        let set = self.source_set;
        if namespaces.is_empty() {
            info!(source_set = %set.name, "No Clojure namespaces defined, skipping");
            return Ok(WarningTally::default());
        }

        let destination = canonical_destination(&set.output)?;
        info!(destination = %destination.display(), "Destination");
        info!(
            "Compiling {}",
            namespaces
                .iter()
                .map(Namespace::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );

        let script = compile_script(namespaces, &destination, &set.options);
        let policy = set.options.reflection_warnings;
        let classifier = WarningClassifier::new(set.roots.clone(), policy, stderr);

        let output = self.driver.run(&script, &self.classpath, stdout, classifier)?;
        let (tally, _) = output.stderr.finish();
        tally.enforce(&policy)?;
        Ok(tally)
    }
}

fn canonical_destination(output: &Path) -> BuildResult<PathBuf> {
    fs::create_dir_all(output).map_err(|e| BuildError::io(output, e))?;
    fs::canonicalize(output).map_err(|e| BuildError::io(output, e))
}
