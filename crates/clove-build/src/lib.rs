//! Clove build infrastructure
//!
//! Drives an external Clojure interpreter as a compiler:
//! - Namespace ↔ path name munging
//! - Namespace resolution from source roots
//! - Incremental invalidation of stale class files
//! - Compile and test script generation
//! - Streaming line decoding of interpreter output
//! - Reflection warning classification
//! - Compile and test tasks over configured source sets

pub mod builder;
pub mod cache;
pub mod compile;
pub mod decoder;
pub mod driver;
pub mod error;
pub mod invalidate;
pub mod munge;
pub mod namespace;
pub mod options;
pub mod script;
pub mod source_set;
pub mod test_runner;
pub mod warnings;

// Re-export main types
pub use builder::{BuildConfig, BuildContext, BuildStats, Builder};
pub use cache::{BuildState, ChangeDetector, Changes, CompileInputs, FileState, Snapshot};
pub use compile::{CompileMode, CompileOutcome, CompileTask};
pub use decoder::{ConsoleSink, LineDecoder, LineHandler};
pub use driver::{Interpreter, ProcessDriver, ProcessOutput};
pub use error::{BuildError, BuildResult};
pub use invalidate::{ChangeKind, InvalidationEvent, Invalidator};
pub use munge::{demunge, munge};
pub use namespace::{find_namespaces, resolve, Namespace, SourceRoots};
pub use options::{CompileOptions, ReflectionWarnings};
pub use script::{compile_script, test_script};
pub use source_set::SourceSet;
pub use test_runner::{TestOutcome, TestTask};
pub use warnings::{WarningClassifier, WarningTally, REFLECTION_WARNING_PREFIX};

// Re-export config types for convenience
pub use clove_config::{Config, ConfigLoader};
