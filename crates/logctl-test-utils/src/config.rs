//! Configuration builders for tests.

use logctl_config::{AppConfig, ContextSeed};

/// Fluent builder for [`AppConfig`] in tests.
///
/// # Example
///
/// ```ignore
/// let config = TestConfigBuilder::new()
///     .context("network", Some("err"))
///     .kv_capacity(64)
///     .build();
/// ```
pub struct TestConfigBuilder {
    config: AppConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.config.output.silent = silent;
        self
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.config.logging.level = level.to_string();
        self
    }

    pub fn global_context(mut self, name: &str) -> Self {
        self.config.registry.global_context = name.to_string();
        self
    }

    pub fn max_contexts(mut self, n: usize) -> Self {
        self.config.registry.max_contexts = n;
        self
    }

    pub fn max_name_len(mut self, n: usize) -> Self {
        self.config.registry.max_name_len = n;
        self
    }

    pub fn default_level(mut self, level: &str) -> Self {
        self.config.registry.default_level = level.to_string();
        self
    }

    /// Seed a context, optionally with its own level.
    pub fn context(mut self, name: &str, level: Option<&str>) -> Self {
        self.config.registry.contexts.push(ContextSeed {
            name: name.to_string(),
            level: level.map(str::to_string),
        });
        self
    }

    pub fn kv_capacity(mut self, capacity: usize) -> Self {
        self.config.logkv.capacity = capacity;
        self
    }

    pub fn kv_overflow(mut self, policy: &str) -> Self {
        self.config.logkv.overflow = policy.to_string();
        self
    }

    pub fn kmsg_device(mut self, path: &str) -> Self {
        self.config.klog.device = path.to_string();
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
