//! Fuzz target for the TOML configuration parser.
//!
//! Run with: cargo +nightly fuzz run fuzz_config_parser
//!
//! Any configuration that passes validation must also build a registry and
//! dispatcher settings.

#![no_main]

use libfuzzer_sys::fuzz_target;
use logctl_config::AppConfig;
use logctl_core::{MemoryRegistry, Settings};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = AppConfig::parse(s) {
        assert!(MemoryRegistry::from_config(&config).is_ok());
        assert!(Settings::from_config(&config).is_ok());
    }
});
