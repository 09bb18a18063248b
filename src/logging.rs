//! Logging configuration for sql-runner.
//!
//! Logs go to stderr so they never interleave with rendered tables on stdout.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Filter used by `--verbose`.
pub const VERBOSE_FILTER: &str = "sql_runner=debug,info";

/// Initializes logging to stderr.
///
/// `RUST_LOG` takes precedence over `fallback`.
pub fn init_stderr_logging(fallback: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(fallback))
        .with_writer(std::io::stderr)
        .init();
}

fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}
