//! Test task: run clojure.test over every namespace of a source set

use crate::decoder::{ConsoleSink, LineHandler};
use crate::driver::ProcessDriver;
use crate::error::{BuildError, BuildResult};
use crate::namespace::{find_namespaces, Namespace};
use crate::script::test_script;
use crate::source_set::SourceSet;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Result of a test run
#[derive(Debug, Clone, Serialize)]
pub struct TestOutcome {
    pub source_set: String,
    pub namespaces: Vec<Namespace>,
    /// No namespaces were found, so nothing ran
    pub skipped: bool,
    pub report: Option<PathBuf>,
}

/// Runs the tests of one source set. Never considered up to date.
pub struct TestTask<'a> {
    source_set: &'a SourceSet,
    driver: &'a ProcessDriver,
    classpath: Vec<PathBuf>,
    junit_report: Option<PathBuf>,
}

impl<'a> TestTask<'a> {
    pub fn new(source_set: &'a SourceSet, driver: &'a ProcessDriver) -> Self {
        Self {
            source_set,
            driver,
            classpath: source_set.compile_classpath(),
            junit_report: None,
        }
    }

    pub fn with_classpath(mut self, classpath: Vec<PathBuf>) -> Self {
        self.classpath = classpath;
        self
    }

    /// Also write a JUnit XML report to `path`
    pub fn with_junit_report(mut self, path: Option<PathBuf>) -> Self {
        self.junit_report = path;
        self
    }

    pub fn run(&self) -> BuildResult<TestOutcome> {
        self.run_with(ConsoleSink::Stdout, ConsoleSink::Stderr)
    }

    /// Run the tests, forwarding interpreter output to the given handlers.
    ///
    /// Failing tests make the runner exit non-zero, which surfaces as
    /// `ProcessFailed`.
    pub fn run_with<O, E>(&self, stdout: O, stderr: E) -> BuildResult<TestOutcome>
    where
        O: LineHandler + Send,
        E: LineHandler + Send,
    {
        let set = self.source_set;
        info!(source_set = %set.name, "Starting test run");

        let files = set.discover()?;
        let namespaces = find_namespaces(&files, &set.roots)?;
        let mut outcome = TestOutcome {
            source_set: set.name.clone(),
            namespaces,
            skipped: false,
            report: self.junit_report.clone(),
        };

        if outcome.namespaces.is_empty() {
            info!(source_set = %set.name, "No Clojure namespaces defined, skipping");
            outcome.skipped = true;
            outcome.report = None;
            return Ok(outcome);
        }

        info!(
            "Testing {}",
            outcome
                .namespaces
                .iter()
                .map(Namespace::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );

        if let Some(parent) = self.junit_report.as_deref().and_then(|p| p.parent()) {
            fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
        }

        let script = test_script(&outcome.namespaces, self.junit_report.as_deref());
        self.driver.run(&script, &self.classpath, stdout, stderr)?;
        Ok(outcome)
    }
}
