//! Compile command - copy or AOT compile source sets

use super::{aot_override, load_builder};
use anyhow::{Context, Result};
use clove_build::{BuildConfig, CompileMode, CompileOutcome};
use std::path::PathBuf;

/// Compile command arguments
#[derive(Default)]
pub struct CompileArgs {
    pub project_dir: Option<PathBuf>,
    /// Only compile this source set
    pub source_set: Option<String>,
    pub aot: bool,
    pub force: bool,
    pub json: bool,
}

/// Run the compile command
pub fn run(args: CompileArgs) -> Result<()> {
    let builder = load_builder(
        args.project_dir.as_deref(),
        BuildConfig {
            aot: aot_override(args.aot),
            force: args.force,
            ..BuildConfig::default()
        },
    )?;

    let outcomes = match &args.source_set {
        Some(name) => vec![builder
            .compile(name)
            .with_context(|| format!("Compiling source set '{}' failed", name))?],
        None => builder.compile_all().context("Compile failed")?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        for outcome in &outcomes {
            println!("{}", describe(outcome));
        }
    }

    Ok(())
}

/// One summary line per compiled source set
pub fn describe(outcome: &CompileOutcome) -> String {
    let namespaces = outcome.namespaces.len();
    let mut line = match outcome.mode {
        CompileMode::UpToDate => format!("{}: up to date", outcome.source_set),
        CompileMode::CopySource => format!(
            "{}: copied {} source files ({} namespaces)",
            outcome.source_set, outcome.copied, namespaces
        ),
        CompileMode::AheadOfTime => format!(
            "{}: compiled {} namespaces",
            outcome.source_set, namespaces
        ),
    };

    if outcome.warnings.project > 0 {
        line.push_str(&format!(", {} reflection warnings", outcome.warnings.project));
    }
    if outcome.warnings.library > 0 {
        line.push_str(&format!(
            ", {} reflection warnings from dependencies",
            outcome.warnings.library
        ));
    }
    line
}
