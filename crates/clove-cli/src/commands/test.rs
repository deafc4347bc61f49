//! Test command - run clojure.test over the test source set

use super::{absolute, load_builder};
use anyhow::{Context, Result};
use clove_build::{BuildConfig, TestOutcome};
use std::path::PathBuf;

/// Test command arguments
#[derive(Default)]
pub struct TestArgs {
    pub project_dir: Option<PathBuf>,
    /// JUnit XML report path
    pub report: Option<PathBuf>,
}

/// Run the test command
pub fn run(args: TestArgs) -> Result<()> {
    let builder = load_builder(
        args.project_dir.as_deref(),
        BuildConfig {
            junit_report: args.report.map(absolute).transpose()?,
            ..BuildConfig::default()
        },
    )?;

    let outcome = builder.test().context("Tests failed")?;
    println!("{}", describe(&outcome));
    Ok(())
}

pub fn describe(outcome: &TestOutcome) -> String {
    if outcome.skipped {
        return format!("{}: no test namespaces", outcome.source_set);
    }
    let mut line = format!(
        "{}: tested {} namespaces",
        outcome.source_set,
        outcome.namespaces.len()
    );
    if let Some(report) = &outcome.report {
        line.push_str(&format!(", report written to {}", report.display()));
    }
    line
}
