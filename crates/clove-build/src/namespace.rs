//! Source roots and namespace resolution
//!
//! A namespace is derived purely from where a file sits below its source
//! root: `<root>/basic_project/core.clj` is `basic-project.core`.

use crate::error::{BuildError, BuildResult};
use crate::munge::demunge;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Dot-separated Clojure namespace name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name segments, outermost first
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Namespace {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Set of canonicalized source root directories
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRoots {
    roots: BTreeSet<PathBuf>,
}

impl SourceRoots {
    /// Build a root set, canonicalizing every directory that exists
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            roots: roots
                .into_iter()
                .map(|root| canonical_or_self(root.as_ref()))
                .collect(),
        }
    }

    pub fn contains(&self, dir: &Path) -> bool {
        self.roots.contains(dir)
    }

    /// Root with the longest path that is an ancestor of `path`
    pub fn owning_root(&self, path: &Path) -> Option<&Path> {
        self.roots
            .iter()
            .filter(|root| path.starts_with(root))
            .max_by_key(|root| root.components().count())
            .map(PathBuf::as_path)
    }

    /// Whether `relative` names an existing file below any root.
    ///
    /// Only plain relative references count: absolute paths and `..`
    /// segments never resolve, wherever they point.
    pub fn resolves(&self, relative: &str) -> bool {
        let relative = Path::new(relative);
        let plain = relative.components().next().is_some()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        plain && self.roots.iter().any(|root| root.join(relative).exists())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.roots.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Canonicalize `path`, falling back to the path itself when it does not exist
pub(crate) fn canonical_or_self(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Derive the namespace of a source file from its position below a root.
///
/// Walks the parent directories upward, prepending each demunged directory
/// name, until a directory in `roots` is reached.
pub fn resolve(file: &Path, roots: &SourceRoots) -> BuildResult<Namespace> {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy())
        .ok_or_else(|| BuildError::no_source_root(file))?;
    let mut namespace = demunge(&stem);

    let parent = file
        .parent()
        .map(canonical_or_self)
        .ok_or_else(|| BuildError::no_source_root(file))?;

    let mut current = Some(parent.as_path());
    while let Some(dir) = current {
        if roots.contains(dir) {
            return Ok(Namespace(namespace));
        }
        let Some(name) = dir.file_name() else {
            break;
        };
        namespace = format!("{}.{}", demunge(&name.to_string_lossy()), namespace);
        current = dir.parent();
    }

    Err(BuildError::no_source_root(file))
}

/// Resolve the namespace of every file, preserving order
pub fn find_namespaces<P: AsRef<Path>>(
    files: &[P],
    roots: &SourceRoots,
) -> BuildResult<Vec<Namespace>> {
    files.iter().map(|f| resolve(f.as_ref(), roots)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "(ns x)").unwrap();
    }

    #[test]
    fn test_resolve_nested_file() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        let file = root.join("a/b/core.clj");
        touch(&file);

        let roots = SourceRoots::new([&root]);
        assert_eq!(resolve(&file, &roots).unwrap().as_str(), "a.b.core");
    }

    #[test]
    fn test_resolve_file_directly_in_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        let file = root.join("core.clj");
        touch(&file);

        let roots = SourceRoots::new([&root]);
        assert_eq!(resolve(&file, &roots).unwrap(), Namespace::from("core"));
    }

    #[test]
    fn test_resolve_demunges_every_segment() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        let file = root.join("basic_project/valid_QMARK_/multi_word.cljc");
        touch(&file);

        let roots = SourceRoots::new([&root]);
        let ns = resolve(&file, &roots).unwrap();
        assert_eq!(ns.as_str(), "basic-project.valid?.multi-word");
        assert_eq!(
            ns.segments().collect::<Vec<_>>(),
            vec!["basic-project", "valid?", "multi-word"]
        );
    }

    #[test]
    fn test_resolve_without_matching_root() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("elsewhere/core.clj");
        touch(&file);

        let roots = SourceRoots::new([temp.path().join("src")]);
        assert!(matches!(
            resolve(&file, &roots),
            Err(BuildError::NoSourceRoot { .. })
        ));
    }

    #[test]
    fn test_resolve_picks_nearest_nested_root() {
        let temp = TempDir::new().unwrap();
        let outer = temp.path().join("src");
        let inner = outer.join("clojure");
        let file = inner.join("app/core.clj");
        touch(&file);

        let roots = SourceRoots::new([&outer, &inner]);
        assert_eq!(resolve(&file, &roots).unwrap().as_str(), "app.core");
    }

    #[test]
    fn test_owning_root_longest_prefix() {
        let temp = TempDir::new().unwrap();
        let outer = temp.path().join("src");
        let inner = outer.join("clojure");
        fs::create_dir_all(&inner).unwrap();

        let roots = SourceRoots::new([&outer, &inner]);
        let file = fs::canonicalize(&inner).unwrap().join("app/core.clj");
        assert_eq!(
            roots.owning_root(&file),
            Some(fs::canonicalize(&inner).unwrap().as_path())
        );
    }

    #[test]
    fn test_resolves_relative_reference() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        touch(&root.join("app/core.clj"));

        let roots = SourceRoots::new([&root]);
        assert!(roots.resolves("app/core.clj"));
        assert!(!roots.resolves("clojure/core.clj"));
    }

    #[test]
    fn test_absolute_or_escaping_reference_does_not_resolve() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        let outside = temp.path().join("lib/dep.clj");
        touch(&root.join("app/core.clj"));
        touch(&outside);

        let roots = SourceRoots::new([&root]);
        assert!(!roots.resolves(&outside.display().to_string()));
        assert!(!roots.resolves("../lib/dep.clj"));
        assert!(!roots.resolves("app/../../lib/dep.clj"));
        assert!(!roots.resolves(""));
        assert!(roots.resolves("./app/core.clj"));
    }

    #[test]
    fn test_find_namespaces_preserves_order() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        let files = vec![root.join("b/core.clj"), root.join("a/core.clj")];
        for f in &files {
            touch(f);
        }

        let roots = SourceRoots::new([&root]);
        let namespaces = find_namespaces(&files, &roots).unwrap();
        assert_eq!(
            namespaces,
            vec![Namespace::from("b.core"), Namespace::from("a.core")]
        );
    }
}
