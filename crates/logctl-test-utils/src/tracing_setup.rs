//! Tracing initialisation for tests.
//!
//! The subscriber is installed at most once per process, so every test may
//! call [`init_test_tracing`].

use tracing_subscriber::EnvFilter;

/// Install a subscriber that writes to the test-harness writer.
///
/// Honours `RUST_LOG`; otherwise shows `debug` for the logctl crates and
/// the mirrored `logctl::record` events.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("warn,logctl_core=debug,logctl_config=debug,logctl::record=debug")
        }))
        .with_test_writer()
        .try_init();
}
