#![deny(unsafe_code)]

//! Shared test utilities for the logctl workspace.
//!
//! Provides config builders, ready-made registries, and tracing helpers so
//! that integration tests stay short.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! logctl-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod session;
pub mod tracing_setup;

pub use config::TestConfigBuilder;
pub use session::{TestSession, scenario_registry};
pub use tracing_setup::init_test_tracing;
