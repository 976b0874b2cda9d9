//! Diagnostic logging.
//!
//! Library code emits `tracing` events; the binary installs a stderr
//! subscriber once. `RUST_LOG` wins over the configured level.

use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber. Safe to call more than once.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
