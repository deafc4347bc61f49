//! Clojure scripts handed to the interpreter
//!
//! The interpreter is driven by generating a small script and loading it with
//! `clojure.main -i`. Compile scripts wrap every `compile` call in one
//! try/catch that exits non-zero on failure; test scripts prepend the bundled
//! test runner and call its `run-tests`.

use crate::namespace::Namespace;
use crate::options::CompileOptions;
use std::path::Path;

/// Test runner loaded before every test script
pub const TEST_RUNNER_PREAMBLE: &str = include_str!("../resources/test_runner.clj");

/// Render a script compiling `namespaces` in order into `destination`.
///
/// Callers skip the interpreter entirely when there is nothing to compile.
pub fn compile_script(
    namespaces: &[Namespace],
    destination: &Path,
    options: &CompileOptions,
) -> String {
    let elide_meta = options
        .elide_meta
        .iter()
        .map(|key| format!(":{}", key))
        .collect::<Vec<_>>()
        .join(" ");

    let compiles = namespaces
        .iter()
        .map(|ns| format!("(compile '{})", ns))
        .collect::<Vec<_>>()
        .join("\n    ");

    [
        "(try".to_string(),
        format!(
            "  (binding [*compile-path* {}",
            clojure_string(&destination.display().to_string())
        ),
        format!(
            "            *warn-on-reflection* {}",
            options.reflection_warnings.enabled
        ),
        format!(
            "            *compiler-options* {{:disable-locals-clearing {}",
            options.disable_locals_clearing
        ),
        format!("                                :elide-meta [{}]", elide_meta),
        format!(
            "                                :direct-linking {}}}]",
            options.direct_linking
        ),
        format!("    {})", compiles),
        "  (catch Throwable e".to_string(),
        "    (.printStackTrace e)".to_string(),
        "    (System/exit 1)))".to_string(),
        "(System/exit 0)".to_string(),
    ]
    .join("\n")
}

/// Render a script running the tests in `namespaces`, optionally writing a
/// JUnit XML report to `report`.
pub fn test_script(namespaces: &[Namespace], report: Option<&Path>) -> String {
    let namespace_vec = format!(
        "'[{}]",
        namespaces
            .iter()
            .map(Namespace::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    );

    let invocation = match report {
        Some(path) => format!(
            "(run-tests {} {})",
            namespace_vec,
            clojure_string(&path.display().to_string())
        ),
        None => format!("(run-tests {})", namespace_vec),
    };

    format!("{}\n{}", TEST_RUNNER_PREAMBLE.trim_end(), invocation)
}

/// Quote `value` as a Clojure string literal
fn clojure_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(ch),
        }
    }
    quoted.push('"');
    quoted
}
