//! Applying a level to every context a pattern selects.

use tracing::debug;

use crate::labels::Level;
use crate::lister::{ListError, list_contexts};
use crate::matcher::is_wildcard;
use crate::registry::{ContextRegistry, RegistryError};
use crate::report::Reporter;

/// Errors from [`set_level_for_pattern`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetLevelError {
    /// An exact name that is not registered.
    #[error("Context '{0}' not found.")]
    NotFound(String),

    /// A wildcard that selected nothing.
    #[error("No contexts matched '{0}'.")]
    NoMatch(String),

    #[error("Error getting contexts info: {}", describe_list(.0))]
    List(#[from] ListError),

    /// The registry refused the change. Contexts earlier in the sorted order
    /// keep their new level.
    #[error("Error setting context log level: {}", .source.describe())]
    Set {
        context: String,
        #[source]
        source: RegistryError,
    },
}

pub(crate) fn describe_list(err: &ListError) -> String {
    match err.registry_error() {
        Some(registry) => registry.describe(),
        None => err.to_string(),
    }
}

/// Set `level` on the context named `pattern`, or on every context a
/// wildcard `pattern` selects, in ascending case-insensitive name order.
///
/// `pattern` must already have had the `.` alias resolved. Each change is
/// announced through `reporter` before it is applied. Returns the names that
/// were changed.
pub fn set_level_for_pattern<R: ContextRegistry + ?Sized>(
    registry: &mut R,
    reporter: &mut Reporter,
    pattern: &str,
    level: Level,
) -> Result<Vec<String>, SetLevelError> {
    if !is_wildcard(pattern) {
        let handle = registry
            .find_context(pattern)
            .map_err(|_| SetLevelError::NotFound(pattern.to_string()))?;
        reporter.info(format_args!("Setting context level for '{pattern}'."));
        registry
            .set_context_level(handle, level)
            .map_err(|source| SetLevelError::Set {
                context: pattern.to_string(),
                source,
            })?;
        return Ok(vec![pattern.to_string()]);
    }

    let snapshot = list_contexts(&*registry, Some(pattern))?;
    if snapshot.is_empty() {
        return Err(SetLevelError::NoMatch(pattern.to_string()));
    }

    let mut changed = Vec::with_capacity(snapshot.len());
    for entry in &snapshot {
        reporter.info(format_args!("Setting context level for '{}'.", entry.name));
        registry
            .set_context_level(entry.handle, level)
            .map_err(|source| SetLevelError::Set {
                context: entry.name.clone(),
                source,
            })?;
        changed.push(entry.name.clone());
    }
    debug!(pattern, level = %level, changed = changed.len(), "Applied level to pattern");
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::memory::{Faults, MemoryRegistry};
    use pretty_assertions::assert_eq;

    fn scenario() -> MemoryRegistry {
        MemoryRegistry::default()
            .with_context("network", Level::Error)
            .and_then(|r| r.with_context("network.wifi", Level::Notice))
            .and_then(|r| r.with_context("ui", Level::Critical))
            .unwrap()
    }

    #[test]
    fn test_exact_set() {
        let mut registry = scenario();
        let (mut reporter, captured) = Reporter::capture(false);

        let changed =
            set_level_for_pattern(&mut registry, &mut reporter, "network", Level::Debug).unwrap();

        assert_eq!(changed, vec!["network"]);
        assert_eq!(registry.level_of("network"), Some(Level::Debug));
        assert_eq!(registry.level_of("network.wifi"), Some(Level::Notice));
        assert_eq!(
            captured.stdout(),
            "logctl: Setting context level for 'network'.\n"
        );
    }

    #[test]
    fn test_wildcard_set_in_sorted_order() {
        let mut registry = scenario();
        let (mut reporter, captured) = Reporter::capture(false);

        let changed =
            set_level_for_pattern(&mut registry, &mut reporter, "network*", Level::Info).unwrap();

        assert_eq!(changed, vec!["network", "network.wifi"]);
        assert_eq!(registry.level_of("network"), Some(Level::Info));
        assert_eq!(registry.level_of("network.wifi"), Some(Level::Info));
        assert_eq!(registry.level_of("ui"), Some(Level::Critical));
        assert_eq!(
            captured.stdout(),
            "logctl: Setting context level for 'network'.\n\
             logctl: Setting context level for 'network.wifi'.\n"
        );
    }

    #[test]
    fn test_not_found_and_no_match_are_distinct() {
        let mut registry = scenario();
        let (mut reporter, _captured) = Reporter::capture(false);

        let exact = set_level_for_pattern(&mut registry, &mut reporter, "audio", Level::Info);
        let wild = set_level_for_pattern(&mut registry, &mut reporter, "audio*", Level::Info);

        assert_eq!(exact, Err(SetLevelError::NotFound("audio".into())));
        assert_eq!(wild, Err(SetLevelError::NoMatch("audio*".into())));
        assert_eq!(exact.unwrap_err().to_string(), "Context 'audio' not found.");
        assert_eq!(wild.unwrap_err().to_string(), "No contexts matched 'audio*'.");
    }

    #[test]
    fn test_failure_partway_keeps_earlier_changes() {
        let mut registry = scenario().with_faults(Faults {
            set_level_for: Some("network.wifi".into()),
            ..Faults::default()
        });
        let (mut reporter, _captured) = Reporter::capture(true);

        let err = set_level_for_pattern(&mut registry, &mut reporter, "*", Level::Debug)
            .unwrap_err();

        assert!(matches!(err, SetLevelError::Set { ref context, .. } if context == "network.wifi"));
        // "<global>" and "network" sort before the failing context.
        assert_eq!(registry.level_of("<global>"), Some(Level::Debug));
        assert_eq!(registry.level_of("network"), Some(Level::Debug));
        assert_eq!(registry.level_of("network.wifi"), Some(Level::Notice));
        assert_eq!(registry.level_of("ui"), Some(Level::Critical));
    }

    #[test]
    fn test_silent_reporter_suppresses_notices() {
        let mut registry = scenario();
        let (mut reporter, captured) = Reporter::capture(true);
        set_level_for_pattern(&mut registry, &mut reporter, "ui", Level::None).unwrap();
        assert_eq!(registry.level_of("ui"), Some(Level::None));
        assert_eq!(captured.stdout(), "");
    }

    #[test]
    fn test_list_failure_surfaces() {
        let mut registry = scenario().with_faults(Faults {
            count: true,
            ..Faults::default()
        });
        let (mut reporter, _captured) = Reporter::capture(false);
        let err = set_level_for_pattern(&mut registry, &mut reporter, "net*", Level::Info)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error getting contexts info: 0x00000001 (unknown error)"
        );
    }
}
