#![deny(unsafe_code)]

//! Configuration loading and validation for logctl.
//!
//! Reads `logctl.toml` into an [`AppConfig`]. Every section is optional and
//! falls back to its defaults; the whole file may be missing.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "logctl.toml";

/// Level labels accepted wherever the configuration names a level.
pub const LEVEL_LABELS: &[&str] = &[
    "none", "emerg", "alert", "crit", "err", "warning", "notice", "info", "debug",
];

const OVERFLOW_POLICIES: &[&str] = &["fail", "truncate"];

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub output: OutputConfig,

    /// Diagnostic logging.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Context registry limits and seeded contexts.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Structured payload encoding for `logkv`.
    #[serde(default)]
    pub logkv: LogKvConfig,

    /// Kernel message device for `klog`.
    #[serde(default)]
    pub klog: KlogConfig,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Suppress informational output, as `-s` does.
    #[serde(default)]
    pub silent: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Tracing filter (e.g. "warn", "debug", "logctl_core=trace").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Registry configuration.
///
/// ## TOML Example
///
/// ```toml
/// [registry]
/// global_context = "<global>"
/// default_level = "info"
///
/// [[registry.contexts]]
/// name = "network"
/// level = "err"
///
/// [[registry.contexts]]
/// name = "ui"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Name the `.` alias resolves to.
    #[serde(default = "default_global_context")]
    pub global_context: String,

    /// Most contexts a listing can hold.
    #[serde(default = "default_max_contexts")]
    pub max_contexts: usize,

    /// Longest context name in bytes.
    #[serde(default = "default_max_name_len")]
    pub max_name_len: usize,

    /// Context `flush` emits on.
    #[serde(default = "default_flush_context")]
    pub flush_context: String,

    /// Level given to newly created contexts.
    #[serde(default = "default_context_level")]
    pub default_level: String,

    /// Contexts registered at startup.
    #[serde(default)]
    pub contexts: Vec<ContextSeed>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            global_context: default_global_context(),
            max_contexts: default_max_contexts(),
            max_name_len: default_max_name_len(),
            flush_context: default_flush_context(),
            default_level: default_context_level(),
            contexts: Vec::new(),
        }
    }
}

fn default_global_context() -> String {
    "<global>".to_string()
}

fn default_max_contexts() -> usize {
    100
}

fn default_max_name_len() -> usize {
    31
}

fn default_flush_context() -> String {
    "logctl".to_string()
}

fn default_context_level() -> String {
    "info".to_string()
}

/// A context registered at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSeed {
    pub name: String,
    /// Falls back to `registry.default_level`.
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogKvConfig {
    /// Payload capacity in bytes, braces included.
    #[serde(default = "default_kv_capacity")]
    pub capacity: usize,

    /// "fail" or "truncate".
    #[serde(default = "default_overflow")]
    pub overflow: String,
}

impl Default for LogKvConfig {
    fn default() -> Self {
        Self {
            capacity: default_kv_capacity(),
            overflow: default_overflow(),
        }
    }
}

fn default_kv_capacity() -> usize {
    1023
}

fn default_overflow() -> String {
    "fail".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KlogConfig {
    #[serde(default = "default_kmsg_device")]
    pub device: String,

    /// Level used when `klog` gets no `-p`.
    #[serde(default = "default_klog_level")]
    pub default_level: String,
}

impl Default for KlogConfig {
    fn default() -> Self {
        Self {
            device: default_kmsg_device(),
            default_level: default_klog_level(),
        }
    }
}

fn default_kmsg_device() -> String {
    "/dev/kmsg".to_string()
}

fn default_klog_level() -> String {
    "notice".to_string()
}

fn check_level(field: &str, label: &str) -> Result<(), ConfigError> {
    if LEVEL_LABELS.contains(&label) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{field} must be one of {LEVEL_LABELS:?}, got {label:?}"
        )))
    }
}

impl AppConfig {
    /// Load configuration from a TOML file at the given path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Like [`AppConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::parse(&content)?;
                debug!(path = %path.display(), "Loaded configuration");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let registry = &self.registry;
        if registry.global_context.is_empty() {
            return Err(ConfigError::Validation(
                "registry.global_context must not be empty".to_string(),
            ));
        }
        if registry.max_contexts == 0 {
            return Err(ConfigError::Validation(
                "registry.max_contexts must be at least 1".to_string(),
            ));
        }
        if registry.max_name_len == 0 {
            return Err(ConfigError::Validation(
                "registry.max_name_len must be at least 1".to_string(),
            ));
        }
        if registry.flush_context.is_empty() {
            return Err(ConfigError::Validation(
                "registry.flush_context must not be empty".to_string(),
            ));
        }
        // Both names are created through the registry, so they share the seed bound.
        for (field, name) in [
            ("registry.global_context", &registry.global_context),
            ("registry.flush_context", &registry.flush_context),
        ] {
            if name.len() > registry.max_name_len {
                return Err(ConfigError::Validation(format!(
                    "{field} {name:?} is longer than max_name_len ({} bytes)",
                    registry.max_name_len
                )));
            }
        }
        check_level("registry.default_level", &registry.default_level)?;

        // The global context takes one slot.
        if registry.contexts.len() + 1 > registry.max_contexts {
            return Err(ConfigError::Validation(format!(
                "registry.contexts has {} entries but max_contexts is {}",
                registry.contexts.len(),
                registry.max_contexts
            )));
        }
        let mut seen = HashSet::new();
        for (i, seed) in registry.contexts.iter().enumerate() {
            if seed.name.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "registry.contexts[{i}].name must not be empty"
                )));
            }
            if seed.name.len() > registry.max_name_len {
                return Err(ConfigError::Validation(format!(
                    "registry.contexts[{i}].name is longer than {} bytes",
                    registry.max_name_len
                )));
            }
            if !seen.insert(seed.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "registry.contexts[{i}].name {:?} is defined twice",
                    seed.name
                )));
            }
            if let Some(level) = &seed.level {
                check_level(&format!("registry.contexts[{i}].level"), level)?;
            }
        }

        if self.logkv.capacity < 2 {
            return Err(ConfigError::Validation(
                "logkv.capacity must be at least 2".to_string(),
            ));
        }
        if !OVERFLOW_POLICIES.contains(&self.logkv.overflow.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logkv.overflow must be one of {OVERFLOW_POLICIES:?}, got {:?}",
                self.logkv.overflow
            )));
        }

        if self.klog.device.is_empty() {
            return Err(ConfigError::Validation(
                "klog.device must not be empty".to_string(),
            ));
        }
        check_level("klog.default_level", &self.klog.default_level)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(!config.output.silent);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.registry.global_context, "<global>");
        assert_eq!(config.registry.max_contexts, 100);
        assert_eq!(config.registry.max_name_len, 31);
        assert_eq!(config.logkv.capacity, 1023);
        assert_eq!(config.logkv.overflow, "fail");
        assert_eq!(config.klog.device, "/dev/kmsg");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.registry.flush_context, "logctl");
        assert!(config.registry.contexts.is_empty());
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
            [output]
            silent = true

            [logging]
            level = "debug"

            [registry]
            global_context = "<root>"
            max_contexts = 10
            default_level = "notice"

            [[registry.contexts]]
            name = "network"
            level = "err"

            [[registry.contexts]]
            name = "ui"

            [logkv]
            capacity = 256
            overflow = "truncate"

            [klog]
            device = "/tmp/kmsg"
            default_level = "warning"
        "#;
        let config = AppConfig::parse(toml).unwrap();
        assert!(config.output.silent);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.registry.global_context, "<root>");
        assert_eq!(config.registry.max_contexts, 10);
        assert_eq!(config.registry.contexts.len(), 2);
        assert_eq!(config.registry.contexts[0].level.as_deref(), Some("err"));
        assert_eq!(config.registry.contexts[1].level, None);
        assert_eq!(config.logkv.capacity, 256);
        assert_eq!(config.logkv.overflow, "truncate");
        assert_eq!(config.klog.default_level, "warning");
    }

    #[test]
    fn test_validation_rejects_unknown_levels() {
        for toml in [
            "[registry]\ndefault_level = \"loud\"",
            "[klog]\ndefault_level = \"verbose\"",
            "[[registry.contexts]]\nname = \"ui\"\nlevel = \"5\"",
        ] {
            let err = AppConfig::parse(toml).unwrap_err();
            assert!(matches!(err, ConfigError::Validation(_)), "{toml}");
        }
    }

    #[test]
    fn test_validation_rejects_bad_overflow() {
        let err = AppConfig::parse("[logkv]\noverflow = \"drop\"").unwrap_err();
        assert!(err.to_string().contains("logkv.overflow"));
    }

    #[test]
    fn test_validation_rejects_tiny_capacity() {
        assert!(AppConfig::parse("[logkv]\ncapacity = 1").is_err());
        assert!(AppConfig::parse("[logkv]\ncapacity = 2").is_ok());
    }

    #[test]
    fn test_validation_rejects_empty_global() {
        assert!(AppConfig::parse("[registry]\nglobal_context = \"\"").is_err());
    }

    #[test]
    fn test_validation_rejects_zero_limits() {
        assert!(AppConfig::parse("[registry]\nmax_contexts = 0").is_err());
        assert!(AppConfig::parse("[registry]\nmax_name_len = 0").is_err());
    }

    #[test]
    fn test_validation_rejects_names_longer_than_limit() {
        let err = AppConfig::parse("[registry]\nmax_name_len = 4\n").unwrap_err();
        assert!(err.to_string().contains("registry.global_context"), "{err}");

        let toml = r#"
            [registry]
            global_context = "<g>"
            max_name_len = 4
            flush_context = "flusher"
        "#;
        let err = AppConfig::parse(toml).unwrap_err();
        assert!(err.to_string().contains("registry.flush_context"), "{err}");

        let fits = r#"
            [registry]
            global_context = "<g>"
            max_name_len = 6
        "#;
        assert!(AppConfig::parse(fits).is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_seeds() {
        let duplicate = r#"
            [[registry.contexts]]
            name = "ui"
            [[registry.contexts]]
            name = "ui"
        "#;
        let err = AppConfig::parse(duplicate).unwrap_err();
        assert!(err.to_string().contains("defined twice"));

        let long = r#"
            [registry]
            max_name_len = 4
            [[registry.contexts]]
            name = "network"
        "#;
        assert!(AppConfig::parse(long).is_err());

        let empty = "[[registry.contexts]]\nname = \"\"";
        assert!(AppConfig::parse(empty).is_err());
    }

    #[test]
    fn test_validation_rejects_too_many_seeds() {
        let toml = r#"
            [registry]
            max_contexts = 2
            [[registry.contexts]]
            name = "a"
            [[registry.contexts]]
            name = "b"
        "#;
        let err = AppConfig::parse(toml).unwrap_err();
        assert!(err.to_string().contains("max_contexts is 2"));
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = AppConfig::parse("[registry\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test_log::test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logctl.toml");
        std::fs::write(&path, "[logging]\nlevel = \"trace\"\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.logging.level, "trace");
    }

    #[test_log::test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Io(_))));
        let config = AppConfig::load_or_default(&path).unwrap();
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let mut config = AppConfig::default();
        config.registry.contexts.push(ContextSeed {
            name: "audio".into(),
            level: Some("debug".into()),
        });
        let text = toml::to_string(&config).unwrap();
        let back = AppConfig::parse(&text).unwrap();
        assert_eq!(back.registry.contexts[0].name, "audio");
        assert_eq!(back.registry.contexts[0].level.as_deref(), Some("debug"));
    }
}
