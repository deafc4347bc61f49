//! Namespaces command - list the namespaces of a source set

use super::load_builder;
use anyhow::{Context, Result};
use clove_build::BuildConfig;
use std::path::PathBuf;

pub struct NamespacesArgs {
    pub project_dir: Option<PathBuf>,
    pub source_set: String,
    pub json: bool,
}

pub fn run(args: NamespacesArgs) -> Result<()> {
    let builder = load_builder(args.project_dir.as_deref(), BuildConfig::default())?;
    let namespaces = builder
        .namespaces(&args.source_set)
        .with_context(|| format!("Failed to list namespaces of '{}'", args.source_set))?;

    if args.json {
        println!("{}", serde_json::to_string(&namespaces)?);
    } else {
        for namespace in namespaces {
            println!("{}", namespace);
        }
    }
    Ok(())
}
