//! The logging-context registry seam.
//!
//! The real registry (context storage, persisted levels, record sinks) lives
//! in the logging library. This module defines the calls `logctl` makes into
//! it as the [`ContextRegistry`] trait, plus an in-process implementation in
//! [`memory`].

pub mod memory;

use crate::labels::Level;

pub use memory::MemoryRegistry;

/// Opaque reference to a context owned by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextHandle(pub(crate) usize);

impl ContextHandle {
    /// Raw slot number, for diagnostics only.
    pub fn raw(self) -> usize {
        self.0
    }
}

/// Errors reported by the registry.
///
/// Each variant maps to a stable numeric code (see [`RegistryError::code`])
/// so failures can be reported the same way across backends.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown error")]
    Unknown,

    #[error("invalid parameter")]
    InvalidParameter,

    #[error("context not found")]
    ContextNotFound,

    #[error("too many contexts")]
    TooManyContexts,

    #[error("invalid context name")]
    InvalidContextName,

    #[error("invalid context index")]
    InvalidIndex,

    #[error("invalid context handle")]
    InvalidHandle,

    #[error("invalid level")]
    InvalidLevel,

    #[error("record rejected: {0}")]
    Rejected(String),
}

impl RegistryError {
    /// Stable error code.
    pub fn code(&self) -> u32 {
        match self {
            RegistryError::Unknown => 0x0000_0001,
            RegistryError::InvalidParameter => 0x0000_0002,
            RegistryError::ContextNotFound => 0x0000_0003,
            RegistryError::TooManyContexts => 0x0000_0004,
            RegistryError::InvalidContextName => 0x0000_0005,
            RegistryError::InvalidIndex => 0x0000_0006,
            RegistryError::InvalidHandle => 0x0000_0007,
            RegistryError::InvalidLevel => 0x0000_0008,
            RegistryError::Rejected(_) => 0x0000_0009,
        }
    }

    /// `0x%08X (description)` form used in user-facing reports.
    pub fn describe(&self) -> String {
        format!("0x{:08X} ({})", self.code(), self)
    }
}

/// Payload of an emitted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordBody {
    /// Plain free-text message.
    Text(String),
    /// Message ID, optional structured data, optional free text.
    Structured {
        msg_id: Option<String>,
        data: Option<String>,
        text: Option<String>,
    },
}

/// The calls `logctl` makes into the logging library.
///
/// Calls are blocking and return before the next step proceeds. Nothing here
/// is transactional: another process may change the registry between a
/// listing and a mutation.
pub trait ContextRegistry {
    /// Total number of registered contexts.
    fn context_count(&self) -> Result<usize, RegistryError>;

    /// The handle at enumeration index `index` (`0..context_count()`).
    fn context_at(&self, index: usize) -> Result<ContextHandle, RegistryError>;

    fn context_name(&self, handle: ContextHandle) -> Result<String, RegistryError>;

    fn context_level(&self, handle: ContextHandle) -> Result<Level, RegistryError>;

    /// Look up a context by exact name.
    fn find_context(&self, name: &str) -> Result<ContextHandle, RegistryError>;

    /// Look up a context by name, creating it if absent.
    fn get_or_create_context(&mut self, name: &str) -> Result<ContextHandle, RegistryError>;

    fn set_context_level(&mut self, handle: ContextHandle, level: Level)
    -> Result<(), RegistryError>;

    /// Emit a record on `handle` at `level`.
    fn emit(
        &mut self,
        handle: ContextHandle,
        level: Level,
        body: RecordBody,
    ) -> Result<(), RegistryError>;

    /// Well-known name of the global context.
    fn global_context_name(&self) -> &str;

    /// Largest number of contexts the registry can hold.
    fn max_contexts(&self) -> usize;

    /// Longest context name, in bytes.
    fn max_name_len(&self) -> usize;
}
