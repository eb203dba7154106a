//! Process bootstrap shared by the factory binaries: tracing and run metrics.

use tracing_subscriber::EnvFilter;

pub mod metrics;

/// Installs the fmt subscriber. `RUST_LOG` picks the filter, INFO otherwise.
/// Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
