//! Filtered, sorted snapshots of the context registry.

use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::bounded::bounded_copy;
use crate::matcher::ContextPattern;
use crate::registry::{ContextHandle, ContextRegistry, RegistryError};

/// One captured `(handle, name)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextEntry {
    pub handle: ContextHandle,
    pub name: String,
}

/// Matching contexts captured at one point in time, sorted by name
/// (ASCII case-insensitive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSnapshot {
    entries: Vec<ContextEntry>,
    capacity: usize,
}

impl ContextSnapshot {
    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries this snapshot could hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContextEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a ContextSnapshot {
    type Item = &'a ContextEntry;
    type IntoIter = std::slice::Iter<'a, ContextEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Errors from building a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    #[error("registry unavailable: {0}")]
    Unavailable(RegistryError),

    #[error("registry reported no contexts")]
    Empty,

    #[error("registry holds {found} contexts, more than the {capacity} a snapshot can hold")]
    Capacity { found: usize, capacity: usize },

    #[error("failed to read context #{index}: {source}")]
    Entry {
        index: usize,
        #[source]
        source: RegistryError,
    },
}

impl ListError {
    /// The underlying registry error, when there is one.
    pub fn registry_error(&self) -> Option<&RegistryError> {
        match self {
            ListError::Unavailable(e) | ListError::Entry { source: e, .. } => Some(e),
            ListError::Empty | ListError::Capacity { .. } => None,
        }
    }
}

/// ASCII case-insensitive byte ordering.
pub fn cmp_names_ignore_case(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}

/// Enumerate the registry and keep the contexts selected by `pattern`.
///
/// Reads only: no context is mutated, and two calls with no change in between
/// return identical snapshots.
pub fn list_contexts<R: ContextRegistry + ?Sized>(
    registry: &R,
    pattern: Option<&str>,
) -> Result<ContextSnapshot, ListError> {
    let capacity = registry.max_contexts();
    let name_len = registry.max_name_len();
    let pattern = ContextPattern::parse(pattern);

    let count = registry.context_count().map_err(ListError::Unavailable)?;
    if count == 0 {
        return Err(ListError::Empty);
    }
    // Matches never outnumber the enumerated contexts, so this bound covers
    // the snapshot as well.
    if count > capacity {
        return Err(ListError::Capacity {
            found: count,
            capacity,
        });
    }

    let mut entries = Vec::with_capacity(count);
    for index in 0..count {
        let handle = registry
            .context_at(index)
            .map_err(|source| ListError::Entry { index, source })?;
        let raw = registry
            .context_name(handle)
            .map_err(|source| ListError::Entry { index, source })?;
        let (name, fit) = bounded_copy(&raw, name_len);
        if fit.is_truncated() {
            warn!(index, name = %raw, limit = name_len, "Context name truncated");
        }

        if !pattern.matches(&name) {
            continue;
        }
        entries.push(ContextEntry { handle, name });
    }

    // Stable sort: names equal under case folding keep registry order.
    entries.sort_by(|a, b| cmp_names_ignore_case(&a.name, &b.name));
    debug!(pattern = ?pattern, total = count, matched = entries.len(), "Listed contexts");

    Ok(ContextSnapshot { entries, capacity })
}
