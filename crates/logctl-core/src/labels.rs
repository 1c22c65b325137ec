//! Symbolic name ↔ integer code tables for severities and syslog facilities.
//!
//! Each table is an ordered slice of `(label, value)` pairs. Lookups scan in
//! declaration order and the first match wins, in both directions.

use std::fmt;

/// An ordered, bidirectional label table.
#[derive(Debug, Clone, Copy)]
pub struct LabelTable<T: 'static> {
    entries: &'static [(&'static str, T)],
}

impl<T: Copy + PartialEq> LabelTable<T> {
    /// Wrap a static slice of `(label, value)` pairs.
    pub const fn new(entries: &'static [(&'static str, T)]) -> Self {
        Self { entries }
    }

    /// Label for `value`, or `None` if the table has no such value.
    pub fn label_of(&self, value: T) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(label, _)| *label)
    }

    /// Value for `label` (exact, case-sensitive), or `None` if unknown.
    pub fn value_of(&self, label: &str) -> Option<T> {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, value)| *value)
    }

    /// All entries in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, T)> + '_ {
        self.entries.iter().copied()
    }
}

/// Severity level of a logging context or a log record.
///
/// Ordered from least to most verbose. [`Level::None`] is the "unset"
/// sentinel (code -1) and is never a valid level for an emitted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    None,
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl Level {
    /// Every level, ordered by code.
    pub const ALL: [Level; 9] = [
        Level::None,
        Level::Emergency,
        Level::Alert,
        Level::Critical,
        Level::Error,
        Level::Warning,
        Level::Notice,
        Level::Info,
        Level::Debug,
    ];

    /// Integer code (`-1` for `None`, `0..=7` otherwise).
    pub fn code(self) -> i32 {
        match self {
            Level::None => -1,
            Level::Emergency => 0,
            Level::Alert => 1,
            Level::Critical => 2,
            Level::Error => 3,
            Level::Warning => 4,
            Level::Notice => 5,
            Level::Info => 6,
            Level::Debug => 7,
        }
    }

    pub fn from_code(code: i32) -> Option<Level> {
        Level::ALL.into_iter().find(|l| l.code() == code)
    }

    /// Parse a level label such as `"err"` or `"debug"`.
    pub fn parse(label: &str) -> Option<Level> {
        LEVELS.value_of(label)
    }

    /// The canonical label for this level.
    pub fn label(self) -> &'static str {
        // Every variant has a row in LEVELS.
        LEVELS.label_of(self).unwrap_or("Unknown")
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Severity labels, in code order.
pub static LEVELS: LabelTable<Level> = LabelTable::new(&[
    ("none", Level::None),
    ("emerg", Level::Emergency),
    ("alert", Level::Alert),
    ("crit", Level::Critical),
    ("err", Level::Error),
    ("warning", Level::Warning),
    ("notice", Level::Notice),
    ("info", Level::Info),
    ("debug", Level::Debug),
]);

/// A syslog facility code (already shifted, e.g. `user` = 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Facility(i32);

impl Facility {
    pub const KERN: Facility = Facility(0);
    pub const USER: Facility = Facility(1 << 3);

    pub fn code(self) -> i32 {
        self.0
    }

    /// Parse a facility label such as `"daemon"` or `"local3"`.
    pub fn parse(label: &str) -> Option<Facility> {
        FACILITIES.value_of(label)
    }

    /// The label for this facility, or `None` for a code outside the table.
    pub fn label(self) -> Option<&'static str> {
        FACILITIES.label_of(self)
    }
}

/// Syslog facility labels.
pub static FACILITIES: LabelTable<Facility> = LabelTable::new(&[
    ("kern", Facility(0)),
    ("user", Facility(1 << 3)),
    ("mail", Facility(2 << 3)),
    ("daemon", Facility(3 << 3)),
    ("auth", Facility(4 << 3)),
    ("syslog", Facility(5 << 3)),
    ("lpr", Facility(6 << 3)),
    ("news", Facility(7 << 3)),
    ("uucp", Facility(8 << 3)),
    ("cron", Facility(9 << 3)),
    ("authpriv", Facility(10 << 3)),
    ("ftp", Facility(11 << 3)),
    ("local0", Facility(16 << 3)),
    ("local1", Facility(17 << 3)),
    ("local2", Facility(18 << 3)),
    ("local3", Facility(19 << 3)),
    ("local4", Facility(20 << 3)),
    ("local5", Facility(21 << 3)),
    ("local6", Facility(22 << 3)),
    ("local7", Facility(23 << 3)),
]);
