//! Source sets: a named group of source roots compiled to one output directory

use crate::error::{BuildError, BuildResult};
use crate::namespace::{canonical_or_self, SourceRoots};
use crate::options::CompileOptions;
use clove_config::{Config, SourceSetLayout};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions recognized as Clojure sources
pub const SOURCE_EXTENSIONS: [&str; 2] = ["clj", "cljc"];

/// Whether `path` has a Clojure source extension
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Source set with absolute, canonicalized paths
#[derive(Debug, Clone)]
pub struct SourceSet {
    /// Source set name (main, test, ...)
    pub name: String,
    /// Source root directories in configuration order
    pub root_dirs: Vec<PathBuf>,
    /// Same roots as a lookup set
    pub roots: SourceRoots,
    /// Destination directory
    pub output: PathBuf,
    /// Extra classpath entries
    pub classpath: Vec<PathBuf>,
    /// Compile options for this set
    pub options: CompileOptions,
}

impl SourceSet {
    /// Resolve a configured layout against the project root
    pub fn from_layout(layout: &SourceSetLayout, config: &Config) -> Self {
        let root_dirs: Vec<PathBuf> = layout
            .roots
            .iter()
            .map(|root| canonical_or_self(&config.resolve(root)))
            .collect();

        Self {
            name: layout.name.clone(),
            roots: SourceRoots::new(&root_dirs),
            root_dirs,
            output: config.resolve(&layout.output),
            classpath: layout
                .classpath
                .iter()
                .map(|entry| config.resolve(entry))
                .collect(),
            options: CompileOptions::from_config(&layout.compile),
        }
    }

    /// Find every source file below the roots, sorted per root.
    ///
    /// Roots that do not exist contribute nothing.
    pub fn discover(&self) -> BuildResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        for root in self.root_dirs.iter().filter(|root| root.is_dir()) {
            let mut found = Vec::new();
            for entry in WalkDir::new(root).follow_links(true) {
                let entry = entry.map_err(|e| {
                    let path = e.path().unwrap_or(root.as_path()).to_path_buf();
                    BuildError::io(path, e.into())
                })?;
                if entry.file_type().is_file() && is_source_file(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            found.sort();
            files.extend(found);
        }

        Ok(files)
    }

    /// Classpath for compiling this set: its entries, then roots, then output
    pub fn compile_classpath(&self) -> Vec<PathBuf> {
        let mut classpath = self.classpath.clone();
        classpath.extend(self.root_dirs.iter().cloned());
        classpath.push(self.output.clone());
        classpath
    }
}
