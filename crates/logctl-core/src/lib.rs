#![deny(unsafe_code)]

//! logctl core.
//!
//! Inspects and changes the levels of named logging contexts, and emits test
//! records into them. Contexts live in a registry reached through the
//! [`ContextRegistry`] trait; [`MemoryRegistry`] is the in-process backend.
//! The `logctl` binary parses the command line into a [`Command`] and hands
//! it to a [`Dispatcher`].

/// Bounded string builders that cut at a fixed capacity.
pub mod bounded;
/// Compile-time build metadata (version, git hash, profile).
pub mod build_info;
/// Command types and the dispatcher.
pub mod command;
/// Kernel message device writer.
pub mod kmsg;
/// `key=value` structured payload encoding.
pub mod kv;
/// Level and facility label tables.
pub mod labels;
/// Sorted, filtered context listings.
pub mod lister;
/// Context name patterns and the global alias.
pub mod matcher;
/// Setting levels on pattern matches.
pub mod mutator;
/// Ring of emitted records.
pub mod records;
/// The registry trait and its in-process implementation.
pub mod registry;
/// User-facing output.
pub mod report;

pub use command::{Command, CommandError, Dispatcher, ErrorKind, Outcome, Settings};
pub use kv::{KvEncoder, KvError, KvPayload, OverflowPolicy};
pub use labels::{Facility, Level};
pub use lister::{ContextSnapshot, list_contexts};
pub use matcher::ContextPattern;
pub use registry::{ContextHandle, ContextRegistry, MemoryRegistry, RecordBody, RegistryError};
pub use report::Reporter;
