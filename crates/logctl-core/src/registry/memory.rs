//! In-process context registry.
//!
//! Stands in for the logging library when no external registry is attached:
//! contexts are seeded from configuration at startup and live for one
//! invocation. Emitted records go to a bounded [`RecordLog`] and are mirrored
//! as `tracing` events under the `logctl::record` target.

use tracing::{debug, error, info, warn};

use logctl_config::AppConfig;

use super::{ContextHandle, ContextRegistry, RecordBody, RegistryError};
use crate::labels::Level;
use crate::records::RecordLog;

/// Default name of the global context.
pub const GLOBAL_CONTEXT_NAME: &str = "<global>";

/// Default maximum number of contexts.
pub const MAX_CONTEXTS: usize = 100;

/// Default maximum context-name length in bytes.
pub const MAX_CONTEXT_NAME_LEN: usize = 31;

const RECORD_LOG_CAPACITY: usize = 256;

/// Sizing and defaults for a [`MemoryRegistry`].
#[derive(Debug, Clone)]
pub struct RegistryLimits {
    pub global_context: String,
    pub max_contexts: usize,
    pub max_name_len: usize,
    /// Level given to newly created contexts.
    pub default_level: Level,
}

impl Default for RegistryLimits {
    fn default() -> Self {
        Self {
            global_context: GLOBAL_CONTEXT_NAME.to_string(),
            max_contexts: MAX_CONTEXTS,
            max_name_len: MAX_CONTEXT_NAME_LEN,
            default_level: Level::Info,
        }
    }
}

/// Failures a [`MemoryRegistry`] can be told to produce.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    /// Fail `context_count`.
    pub count: bool,
    /// Report this many contexts instead of the real number.
    pub reported_count: Option<usize>,
    /// Fail `context_name` for the context at this enumeration index.
    pub name_at: Option<usize>,
    /// Report `(index, name)`: `name` for the context at `index`, bypassing
    /// the name-length check.
    pub rename: Option<(usize, String)>,
    /// Fail `set_context_level` for the context with this name.
    pub set_level_for: Option<String>,
    /// Fail every `emit`.
    pub emit: bool,
}

#[derive(Debug, Clone)]
struct Slot {
    name: String,
    level: Level,
}

/// An in-memory [`ContextRegistry`].
#[derive(Debug)]
pub struct MemoryRegistry {
    limits: RegistryLimits,
    slots: Vec<Slot>,
    records: RecordLog,
    faults: Faults,
}

impl MemoryRegistry {
    /// Create a registry holding only the global context.
    ///
    /// Fails with [`RegistryError::InvalidContextName`] when the global name
    /// is empty or longer than `max_name_len`, the same rule every other
    /// context is held to.
    pub fn new(limits: RegistryLimits) -> Result<Self, RegistryError> {
        let global = &limits.global_context;
        if global.is_empty() || global.len() > limits.max_name_len {
            return Err(RegistryError::InvalidContextName);
        }
        Ok(Self::with_global(limits))
    }

    fn with_global(limits: RegistryLimits) -> Self {
        let global = Slot {
            name: limits.global_context.clone(),
            level: limits.default_level,
        };
        Self {
            limits,
            slots: vec![global],
            records: RecordLog::new(RECORD_LOG_CAPACITY),
            faults: Faults::default(),
        }
    }

    /// Build a registry from the `[registry]` section of the configuration,
    /// pre-registering every `[[registry.contexts]]` entry.
    pub fn from_config(config: &AppConfig) -> Result<Self, RegistryError> {
        let section = &config.registry;
        let default_level =
            Level::parse(&section.default_level).ok_or(RegistryError::InvalidLevel)?;
        let mut registry = Self::new(RegistryLimits {
            global_context: section.global_context.clone(),
            max_contexts: section.max_contexts,
            max_name_len: section.max_name_len,
            default_level,
        })?;
        for seed in &section.contexts {
            let level = match seed.level.as_deref() {
                Some(label) => Level::parse(label).ok_or(RegistryError::InvalidLevel)?,
                None => default_level,
            };
            registry.define(&seed.name, level)?;
        }
        debug!(contexts = registry.slots.len(), "In-process registry ready");
        Ok(registry)
    }

    /// Register (or update) `name` at `level`. Builder-style helper for seeding.
    pub fn define(&mut self, name: &str, level: Level) -> Result<ContextHandle, RegistryError> {
        let handle = self.get_or_create_context(name)?;
        self.slots[handle.0].level = level;
        Ok(handle)
    }

    /// Chainable variant of [`MemoryRegistry::define`] for fixtures.
    pub fn with_context(mut self, name: &str, level: Level) -> Result<Self, RegistryError> {
        self.define(name, level)?;
        Ok(self)
    }

    pub fn with_faults(mut self, faults: Faults) -> Self {
        self.faults = faults;
        self
    }

    pub fn faults_mut(&mut self) -> &mut Faults {
        &mut self.faults
    }

    /// Records emitted so far (most recent last).
    pub fn records(&self) -> &RecordLog {
        &self.records
    }

    /// Current level of `name`, if registered.
    pub fn level_of(&self, name: &str) -> Option<Level> {
        self.slots.iter().find(|s| s.name == name).map(|s| s.level)
    }

    pub fn limits(&self) -> &RegistryLimits {
        &self.limits
    }

    fn slot(&self, handle: ContextHandle) -> Result<&Slot, RegistryError> {
        self.slots.get(handle.0).ok_or(RegistryError::InvalidHandle)
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::with_global(RegistryLimits::default())
    }
}

impl ContextRegistry for MemoryRegistry {
    fn context_count(&self) -> Result<usize, RegistryError> {
        if self.faults.count {
            return Err(RegistryError::Unknown);
        }
        Ok(self.faults.reported_count.unwrap_or(self.slots.len()))
    }

    fn context_at(&self, index: usize) -> Result<ContextHandle, RegistryError> {
        if index < self.slots.len() {
            Ok(ContextHandle(index))
        } else {
            Err(RegistryError::InvalidIndex)
        }
    }

    fn context_name(&self, handle: ContextHandle) -> Result<String, RegistryError> {
        if self.faults.name_at == Some(handle.0) {
            return Err(RegistryError::Unknown);
        }
        if let Some((index, name)) = &self.faults.rename {
            if *index == handle.0 {
                return Ok(name.clone());
            }
        }
        Ok(self.slot(handle)?.name.clone())
    }

    fn context_level(&self, handle: ContextHandle) -> Result<Level, RegistryError> {
        Ok(self.slot(handle)?.level)
    }

    fn find_context(&self, name: &str) -> Result<ContextHandle, RegistryError> {
        self.slots
            .iter()
            .position(|s| s.name == name)
            .map(ContextHandle)
            .ok_or(RegistryError::ContextNotFound)
    }

    fn get_or_create_context(&mut self, name: &str) -> Result<ContextHandle, RegistryError> {
        if let Ok(handle) = self.find_context(name) {
            return Ok(handle);
        }
        if name.is_empty() || name.len() > self.limits.max_name_len {
            return Err(RegistryError::InvalidContextName);
        }
        if self.slots.len() >= self.limits.max_contexts {
            return Err(RegistryError::TooManyContexts);
        }
        self.slots.push(Slot {
            name: name.to_string(),
            level: self.limits.default_level,
        });
        debug!(context = name, "Created context");
        Ok(ContextHandle(self.slots.len() - 1))
    }

    fn set_context_level(
        &mut self,
        handle: ContextHandle,
        level: Level,
    ) -> Result<(), RegistryError> {
        let failing = self.faults.set_level_for.as_deref();
        let slot = self
            .slots
            .get_mut(handle.0)
            .ok_or(RegistryError::InvalidHandle)?;
        if failing == Some(slot.name.as_str()) {
            return Err(RegistryError::Unknown);
        }
        debug!(context = %slot.name, from = %slot.level, to = %level, "Context level changed");
        slot.level = level;
        Ok(())
    }

    fn emit(
        &mut self,
        handle: ContextHandle,
        level: Level,
        body: RecordBody,
    ) -> Result<(), RegistryError> {
        if self.faults.emit {
            return Err(RegistryError::Rejected("emission disabled".to_string()));
        }
        if level == Level::None {
            return Err(RegistryError::InvalidLevel);
        }
        let context = self.slot(handle)?.name.clone();
        mirror_record(&context, level, &body);
        self.records.push(context, level, body);
        Ok(())
    }

    fn global_context_name(&self) -> &str {
        &self.limits.global_context
    }

    fn max_contexts(&self) -> usize {
        self.limits.max_contexts
    }

    fn max_name_len(&self) -> usize {
        self.limits.max_name_len
    }
}

fn mirror_record(context: &str, level: Level, body: &RecordBody) {
    let (msg_id, data, text) = match body {
        RecordBody::Text(text) => (None, None, Some(text.as_str())),
        RecordBody::Structured { msg_id, data, text } => {
            (msg_id.as_deref(), data.as_deref(), text.as_deref())
        }
    };
    let msg_id = msg_id.unwrap_or("-");
    let data = data.unwrap_or("");
    let text = text.unwrap_or("");
    match level {
        Level::Emergency | Level::Alert | Level::Critical | Level::Error => {
            error!(target: "logctl::record", context, level = %level, msg_id, data, "{text}")
        }
        Level::Warning => {
            warn!(target: "logctl::record", context, level = %level, msg_id, data, "{text}")
        }
        Level::Notice | Level::Info => {
            info!(target: "logctl::record", context, level = %level, msg_id, data, "{text}")
        }
        Level::Debug | Level::None => {
            debug!(target: "logctl::record", context, level = %level, msg_id, data, "{text}")
        }
    }
}
