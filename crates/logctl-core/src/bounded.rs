//! Bounded string building.
//!
//! [`BoundedBuf`] holds at most `capacity` bytes of UTF-8 text. Every write
//! that does not fit is cut at the last character boundary that does, and the
//! caller is told about it through [`Fit::Truncated`] instead of the text
//! silently coming up short.

use std::fmt;

// Larger capacities grow on demand.
const PREALLOC_LIMIT: usize = 4096;

/// Outcome of a bounded write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Fit {
    /// The whole input was written.
    Complete,
    /// Only a prefix was written; the buffer is now full (or nearly so).
    Truncated,
}

impl Fit {
    pub fn is_truncated(self) -> bool {
        self == Fit::Truncated
    }
}

/// A string buffer that never grows past a fixed byte capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedBuf {
    buf: String,
    capacity: usize,
    truncated: bool,
}

impl BoundedBuf {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity.min(PREALLOC_LIMIT)),
            capacity,
            truncated: false,
        }
    }

    /// Replace the contents with `src`.
    pub fn copy_from(&mut self, src: &str) -> Fit {
        self.buf.clear();
        self.truncated = false;
        self.push_str(src)
    }

    /// Append `src`, keeping as much of it as fits.
    pub fn push_str(&mut self, src: &str) -> Fit {
        let room = self.remaining();
        if src.len() <= room {
            self.buf.push_str(src);
            return Fit::Complete;
        }
        let cut = floor_char_boundary(src, room);
        self.buf.push_str(&src[..cut]);
        self.truncated = true;
        Fit::Truncated
    }

    pub fn push(&mut self, c: char) -> Fit {
        let mut tmp = [0u8; 4];
        self.push_str(c.encode_utf8(&mut tmp))
    }

    /// Replace the contents with formatted output.
    pub fn format(&mut self, args: fmt::Arguments<'_>) -> Fit {
        self.buf.clear();
        self.truncated = false;
        // Writing into a BoundedBuf never reports fmt::Error.
        let _ = fmt::Write::write_fmt(self, args);
        if self.truncated {
            Fit::Truncated
        } else {
            Fit::Complete
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes still available.
    pub fn remaining(&self) -> usize {
        self.capacity - self.buf.len()
    }

    /// Whether any write since the last reset was cut short.
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

impl fmt::Write for BoundedBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let _ = self.push_str(s);
        Ok(())
    }
}

impl fmt::Display for BoundedBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buf)
    }
}

/// Copy `src` into a fresh buffer of `capacity` bytes.
pub fn bounded_copy(src: &str, capacity: usize) -> (String, Fit) {
    let mut buf = BoundedBuf::new(capacity);
    let fit = buf.copy_from(src);
    (buf.into_string(), fit)
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    let mut i = max;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}
