//! Ready-to-run command sessions.
//!
//! A [`TestSession`] bundles an in-process registry, dispatcher settings, and
//! a temporary file standing in for the kernel message device. The temp
//! directory is removed when the session is dropped.

use std::path::PathBuf;

use logctl_config::AppConfig;
use logctl_core::report::Captured;
use logctl_core::{Command, Dispatcher, Level, MemoryRegistry, Reporter, Settings};
use tempfile::TempDir;

/// Registry holding `network` (err), `network.wifi` (notice) and `ui` (crit)
/// next to the global context.
pub fn scenario_registry() -> MemoryRegistry {
    MemoryRegistry::default()
        .with_context("network", Level::Error)
        .and_then(|r| r.with_context("network.wifi", Level::Notice))
        .and_then(|r| r.with_context("ui", Level::Critical))
        .expect("scenario contexts fit the default limits")
}

pub struct TestSession {
    pub registry: MemoryRegistry,
    pub settings: Settings,
    pub kmsg_path: PathBuf,
    _temp_dir: TempDir,
}

impl TestSession {
    /// A session over [`scenario_registry`] with default settings.
    pub fn scenario() -> Self {
        Self::with_registry(scenario_registry(), Settings::default())
    }

    /// A session built from `config`, with the kernel device redirected to a
    /// temp file.
    pub fn from_config(mut config: AppConfig) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let kmsg_path = temp_dir.path().join("kmsg");
        std::fs::write(&kmsg_path, "").expect("failed to create kmsg file");
        config.klog.device = kmsg_path.display().to_string();

        let registry = MemoryRegistry::from_config(&config).expect("invalid registry config");
        let settings = Settings::from_config(&config).expect("invalid dispatcher config");
        Self {
            registry,
            settings,
            kmsg_path,
            _temp_dir: temp_dir,
        }
    }

    /// Parse `toml_content` and build a session from it.
    pub fn with_toml(toml_content: &str) -> Self {
        let config = AppConfig::parse(toml_content).expect("failed to parse test config");
        Self::from_config(config)
    }

    pub fn with_registry(registry: MemoryRegistry, mut settings: Settings) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let kmsg_path = temp_dir.path().join("kmsg");
        std::fs::write(&kmsg_path, "").expect("failed to create kmsg file");
        settings.kmsg_path = kmsg_path.clone();
        Self {
            registry,
            settings,
            kmsg_path,
            _temp_dir: temp_dir,
        }
    }

    /// Run `command` through a capturing reporter. Returns whether it
    /// succeeded and what it printed.
    pub fn run(&mut self, command: Command, silent: bool) -> (bool, Captured) {
        let (mut reporter, captured) = Reporter::capture(silent);
        let ok = Dispatcher::new(&mut self.registry, &mut reporter, &self.settings).run(command);
        (ok, captured)
    }

    /// Everything written to the kernel message file so far.
    pub fn kmsg_contents(&self) -> String {
        std::fs::read_to_string(&self.kmsg_path).expect("failed to read kmsg file")
    }
}
