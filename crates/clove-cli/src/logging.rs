//! Log output setup

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "CLOVE_LOG";

/// Send logs to stderr, filtered by `CLOVE_LOG` (default `warn`).
///
/// `--verbose` raises the default to `debug`; an explicit `CLOVE_LOG` wins.
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}
