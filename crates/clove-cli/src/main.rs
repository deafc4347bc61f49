use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod logging;

/// Clove - build driver for Clojure projects.
///
/// Compiles Clojure source sets (copying sources or AOT compiling them to
/// class files) and runs clojure.test suites through an external JVM.
///
/// EXAMPLES:
///     clove compile                    Compile every source set
///     clove compile --aot              AOT compile to class files
///     clove test --report out.xml      Run tests with a JUnit report
///     clove check                      Compile everything, then test
///     clove munge my-app.core          Namespace to path segment
///
/// ENVIRONMENT VARIABLES:
///     CLOVE_LOG                   Log filter (e.g. debug, clove_build=trace)
///     CLOVE_AOT                   Override [compile] aot
///     CLOVE_REFLECTION_WARNINGS   Override [compile.reflection-warnings] enabled
///     CLOVE_JAVA                  Java launcher to use
#[derive(Parser)]
#[command(name = "clove")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Project directory (defaults to the current directory)
    #[arg(long, short = 'C', global = true)]
    project_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile source sets
    ///
    /// Copies sources to the output directory, or AOT compiles them when
    /// `aot` is enabled. Unchanged source sets are skipped.
    ///
    /// EXAMPLES:
    ///     clove compile                  Compile all source sets
    ///     clove compile -s main --aot    AOT compile the main set
    ///     clove compile --force          Ignore recorded state
    #[command(visible_alias = "c")]
    Compile {
        /// Only compile this source set
        #[arg(long, short = 's')]
        source_set: Option<String>,
        /// AOT compile regardless of clove.toml
        #[arg(long)]
        aot: bool,
        /// Recompile even when nothing changed
        #[arg(long)]
        force: bool,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run clojure.test over the test source set
    ///
    /// EXAMPLES:
    ///     clove test                                  Run all tests
    ///     clove test --report build/reports/tests.xml Write a JUnit report
    #[command(visible_alias = "t")]
    Test {
        /// Write a JUnit XML report to this path
        #[arg(long, short = 'r')]
        report: Option<PathBuf>,
    },

    /// Compile every source set, then run the tests
    Check {
        /// AOT compile regardless of clove.toml
        #[arg(long)]
        aot: bool,
        /// Write a JUnit XML report to this path
        #[arg(long, short = 'r')]
        report: Option<PathBuf>,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the namespaces of a source set in compile order
    Namespaces {
        /// Source set to list
        #[arg(long, short = 's', default_value = "main")]
        source_set: String,
        /// Print a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Encode a name into its file-system safe form
    ///
    /// EXAMPLES:
    ///     clove munge my-app.core?       Prints my_app.core_QMARK_
    Munge {
        /// Name to encode
        name: String,
    },

    /// Decode a munged name
    ///
    /// EXAMPLES:
    ///     clove demunge string_QMARK_    Prints string?
    Demunge {
        /// Name to decode
        name: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let project_dir = cli.project_dir;

    match cli.command {
        Commands::Compile {
            source_set,
            aot,
            force,
            json,
        } => {
            let args = commands::compile::CompileArgs {
                project_dir,
                source_set,
                aot,
                force,
                json,
            };
            commands::compile::run(args)?;
        }
        Commands::Test { report } => {
            let args = commands::test::TestArgs {
                project_dir,
                report,
            };
            commands::test::run(args)?;
        }
        Commands::Check { aot, report, json } => {
            let args = commands::check::CheckArgs {
                project_dir,
                aot,
                report,
                json,
            };
            commands::check::run(args)?;
        }
        Commands::Namespaces { source_set, json } => {
            let args = commands::namespaces::NamespacesArgs {
                project_dir,
                source_set,
                json,
            };
            commands::namespaces::run(args)?;
        }
        Commands::Munge { name } => {
            println!("{}", clove_build::munge(&name));
        }
        Commands::Demunge { name } => {
            println!("{}", clove_build::demunge(&name));
        }
    }

    Ok(())
}
