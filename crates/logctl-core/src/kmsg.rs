//! Kernel message device writer.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::bounded::BoundedBuf;
use crate::labels::{Facility, Level};

/// Default kernel message device.
pub const KMSG_PATH: &str = "/dev/kmsg";

// "<" + up to three digits + ">" with room to spare.
const PRIORITY_PREFIX_CAPACITY: usize = 7;

#[derive(Debug, thiserror::Error)]
pub enum KmsgError {
    #[error("Error opening {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error writing {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The `<N>` syslog priority prefix for `level`, optionally combined with a
/// facility. `Level::None` yields no prefix.
pub fn priority_prefix(level: Level, facility: Option<Facility>) -> String {
    if level == Level::None {
        return String::new();
    }
    let priority = level.code() | facility.map_or(0, Facility::code);
    let mut buf = BoundedBuf::new(PRIORITY_PREFIX_CAPACITY);
    // Facility and level codes never exceed three digits.
    let _ = buf.format(format_args!("<{priority}>"));
    buf.into_string()
}

/// Write one line to the kernel message device at `path`.
pub fn write_kmsg(
    path: &Path,
    level: Level,
    facility: Option<Facility>,
    message: &str,
) -> Result<(), KmsgError> {
    let mut device = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|source| KmsgError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let line = format!("{}{message}\n", priority_prefix(level, facility));
    device
        .write_all(line.as_bytes())
        .map_err(|source| KmsgError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = %path.display(), level = %level, "Wrote kernel message");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    #[test]
    fn test_priority_prefix() {
        assert_eq!(priority_prefix(Level::Notice, None), "<5>");
        assert_eq!(priority_prefix(Level::Error, Some(Facility::USER)), "<11>");
        assert_eq!(
            priority_prefix(Level::Debug, Facility::parse("local7")),
            "<191>"
        );
        assert_eq!(priority_prefix(Level::None, Some(Facility::USER)), "");
    }

    #[test]
    fn test_write_appends_line() {
        let file = NamedTempFile::new().unwrap();
        write_kmsg(file.path(), Level::Warning, None, "disk almost full").unwrap();

        let written = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(written, "<4>disk almost full\n");
    }

    #[test]
    fn test_successive_writes_append() {
        let file = NamedTempFile::new().unwrap();
        write_kmsg(file.path(), Level::Notice, None, "one").unwrap();
        write_kmsg(file.path(), Level::None, None, "two").unwrap();

        let written = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(written, "<5>one\ntwo\n");
    }

    #[test]
    fn test_missing_device_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_kmsg(&dir.path().join("nope"), Level::Info, None, "x").unwrap_err();
        assert!(matches!(err, KmsgError::Open { .. }));
        assert!(err.to_string().starts_with("Error opening "));
    }
}
