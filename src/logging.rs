//! Diagnostic logging setup.
//!
//! Diagnostics go to stderr through `tracing`; the human-readable run output
//! stays on stdout via `output::OutputFormatter`.

use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "homesort=warn";

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
