//! Check command - compile everything, then run the tests

use super::{absolute, aot_override, compile, load_builder, test};
use anyhow::{Context, Result};
use clove_build::BuildConfig;
use std::path::PathBuf;

/// Check command arguments
#[derive(Default)]
pub struct CheckArgs {
    pub project_dir: Option<PathBuf>,
    pub aot: bool,
    pub report: Option<PathBuf>,
    pub json: bool,
}

/// Run the check command
pub fn run(args: CheckArgs) -> Result<()> {
    let builder = load_builder(
        args.project_dir.as_deref(),
        BuildConfig {
            aot: aot_override(args.aot),
            junit_report: args.report.map(absolute).transpose()?,
            ..BuildConfig::default()
        },
    )?;

    let context = builder.check().context("Check failed")?;

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "success": true,
                "total_time": context.stats.total_time.as_secs_f64(),
                "namespaces": context.stats.namespaces,
                "reflection_warnings": context.stats.warnings,
                "compiled": context.compiled,
                "test": context.test,
            })
        );
    } else {
        for outcome in &context.compiled {
            println!("{}", compile::describe(outcome));
        }
        if let Some(outcome) = &context.test {
            println!("{}", test::describe(outcome));
        }
        println!(
            "Check succeeded in {:.2}s",
            context.stats.total_time.as_secs_f64()
        );
    }

    Ok(())
}
