//! Reflection warning classification
//!
//! The compiler reports unresolved member access on stderr as
//! `Reflection warning, <file>:<line>:<col> - <message>`. The classifier sits
//! between the stderr decoder and the real sink, counting these lines and,
//! under the project-only policy, hiding the ones that come from dependencies.

use crate::decoder::LineHandler;
use crate::error::{BuildError, BuildResult};
use crate::namespace::SourceRoots;
use crate::options::ReflectionWarnings;
use serde::Serialize;

/// Prefix the compiler puts on every reflection warning
pub const REFLECTION_WARNING_PREFIX: &str = "Reflection warning, ";

/// Reflection warning counts for one compile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WarningTally {
    /// Warnings in the project's own sources
    pub project: usize,
    /// Warnings in dependencies (only counted under the project-only policy)
    pub library: usize,
}

impl WarningTally {
    /// Fail when the policy treats project warnings as errors
    pub fn enforce(&self, policy: &ReflectionWarnings) -> BuildResult<()> {
        if policy.as_errors && self.project > 0 {
            return Err(BuildError::ReflectionWarningsAsErrors {
                count: self.project,
            });
        }
        Ok(())
    }
}

/// Line handler that classifies reflection warnings before forwarding
#[derive(Debug)]
pub struct WarningClassifier<S> {
    roots: SourceRoots,
    policy: ReflectionWarnings,
    sink: S,
    tally: WarningTally,
}

impl<S: LineHandler> WarningClassifier<S> {
    pub fn new(roots: SourceRoots, policy: ReflectionWarnings, sink: S) -> Self {
        Self {
            roots,
            policy,
            sink,
            tally: WarningTally::default(),
        }
    }

    pub fn tally(&self) -> WarningTally {
        self.tally
    }

    /// Emit the dependency summary line and return the final counts with the sink
    pub fn finish(mut self) -> (WarningTally, S) {
        if self.tally.library > 0 {
            let summary = format!(
                "{} reflection warnings from dependencies\n",
                self.tally.library
            );
            self.sink.handle_line(&summary);
        }
        (self.tally, self.sink)
    }

    fn is_project_file(&self, reference: &str) -> bool {
        !self.policy.project_only || self.roots.resolves(reference)
    }
}

impl<S: LineHandler> LineHandler for WarningClassifier<S> {
    fn handle_line(&mut self, line: &str) {
        let Some(rest) = line.strip_prefix(REFLECTION_WARNING_PREFIX) else {
            self.sink.handle_line(line);
            return;
        };

        if self.is_project_file(file_reference(rest)) {
            self.tally.project += 1;
            self.sink.handle_line(line);
        } else {
            self.tally.library += 1;
        }
    }
}

/// File part of a warning: everything before the first colon
fn file_reference(rest: &str) -> &str {
    match rest.find(':') {
        Some(colon) => &rest[..colon],
        None => rest.trim_end_matches(|c: char| c == '\r' || c == '\n'),
    }
}
