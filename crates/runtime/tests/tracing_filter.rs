//! `init_tracing` installs a global subscriber, so this lives in its own test binary.

use tracing::Level;

#[test]
fn rust_log_enables_debug_events() {
    std::env::set_var("RUST_LOG", "debug");
    tf_runtime::init_tracing();
    assert!(tracing::enabled!(Level::DEBUG), "RUST_LOG=debug was not applied");
    assert!(!tracing::enabled!(Level::TRACE));
}
