//! Bounded ring of emitted log records.
//!
//! [`RecordLog`] keeps the most recent records written through the
//! in-process registry so callers and tests can inspect what was emitted.

use std::time::Instant;

use crate::labels::Level;
use crate::registry::RecordBody;

/// One emitted record.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Seconds since the log was created.
    pub elapsed_secs: f64,
    /// Name of the context the record was emitted on.
    pub context: String,
    pub level: Level,
    pub body: RecordBody,
}

impl LogRecord {
    /// The free-text part of the record, if any.
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            RecordBody::Text(text) => Some(text),
            RecordBody::Structured { text, .. } => text.as_deref(),
        }
    }

    /// The structured-data payload, if any.
    pub fn data(&self) -> Option<&str> {
        match &self.body {
            RecordBody::Text(_) => None,
            RecordBody::Structured { data, .. } => data.as_deref(),
        }
    }

    pub fn msg_id(&self) -> Option<&str> {
        match &self.body {
            RecordBody::Text(_) => None,
            RecordBody::Structured { msg_id, .. } => msg_id.as_deref(),
        }
    }
}

/// A capacity-bounded record ring; the oldest record is evicted first.
#[derive(Debug)]
pub struct RecordLog {
    entries: Vec<LogRecord>,
    capacity: usize,
    start_time: Instant,
}

impl RecordLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            start_time: Instant::now(),
        }
    }

    pub fn push(&mut self, context: String, level: Level, body: RecordBody) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.remove(0);
        }
        self.entries.push(LogRecord {
            elapsed_secs: self.start_time.elapsed().as_secs_f64(),
            context,
            level,
            body,
        });
    }

    pub fn entries(&self) -> &[LogRecord] {
        &self.entries
    }

    pub fn last(&self) -> Option<&LogRecord> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
