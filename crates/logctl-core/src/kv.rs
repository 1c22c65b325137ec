//! Structured-data payloads built from `key=value` arguments.
//!
//! Tokens become one object-shaped string, `{"k1":v1,"k2":v2}`. Keys are
//! quoted; values are copied verbatim, so a string value must arrive already
//! quoted (`user="alice"`). Nothing is escaped.
//!
//! The payload has a fixed byte capacity. What happens when it does not fit
//! is an explicit [`OverflowPolicy`]: either the encode fails, or the payload
//! is cut short and flagged as truncated. A truncated payload is usually not
//! valid JSON any more.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::bounded::BoundedBuf;

/// Capacity used when the configuration does not say otherwise.
pub const DEFAULT_PAYLOAD_CAPACITY: usize = 1023;

/// Payload for a record with no pairs.
pub const EMPTY_OBJECT: &str = "{}";

/// What to do when a payload exceeds its capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Reject the whole payload.
    #[default]
    Fail,
    /// Keep the longest prefix that fits and flag it.
    Truncate,
}

impl FromStr for OverflowPolicy {
    type Err = KvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail" => Ok(OverflowPolicy::Fail),
            "truncate" => Ok(OverflowPolicy::Truncate),
            other => Err(KvError::Policy(other.to_string())),
        }
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OverflowPolicy::Fail => "fail",
            OverflowPolicy::Truncate => "truncate",
        })
    }
}

/// Errors from encoding a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KvError {
    /// A token without `=`, or with an empty key or value.
    #[error("key and value pair is wrong : {token}")]
    Malformed { index: usize, token: String },

    #[error("structured data needs {needed} bytes but only {capacity} are available")]
    Capacity { needed: usize, capacity: usize },

    #[error("unknown overflow policy {0:?} (expected \"fail\" or \"truncate\")")]
    Policy(String),
}

/// An encoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvPayload {
    text: String,
    pairs: usize,
    truncated: bool,
}

impl KvPayload {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of pairs encoded (including any cut short).
    pub fn pairs(&self) -> usize {
        self.pairs
    }

    /// Whether the payload was cut to fit its capacity.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for KvPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Split `token` at its first `=`.
///
/// The key is everything before it and the value everything after, so the
/// value may itself contain `=`. Both must be non-empty.
pub fn split_pair(token: &str) -> Option<(&str, &str)> {
    let (key, value) = token.split_once('=')?;
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Encodes `key=value` tokens into a bounded payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KvEncoder {
    capacity: usize,
    overflow: OverflowPolicy,
}

impl Default for KvEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_PAYLOAD_CAPACITY, OverflowPolicy::default())
    }
}

impl KvEncoder {
    pub fn new(capacity: usize, overflow: OverflowPolicy) -> Self {
        Self { capacity, overflow }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn overflow(&self) -> OverflowPolicy {
        self.overflow
    }

    /// Encode `tokens` in order.
    ///
    /// Every token is parsed before anything is written: the first malformed
    /// token aborts the encode and no payload is produced.
    pub fn encode<S: AsRef<str>>(&self, tokens: &[S]) -> Result<KvPayload, KvError> {
        let pairs = tokens
            .iter()
            .enumerate()
            .map(|(index, token)| {
                let token = token.as_ref();
                split_pair(token).ok_or_else(|| KvError::Malformed {
                    index,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let needed = encoded_len(&pairs);
        if needed > self.capacity && self.overflow == OverflowPolicy::Fail {
            return Err(KvError::Capacity {
                needed,
                capacity: self.capacity,
            });
        }

        let mut buf = BoundedBuf::new(self.capacity);
        let _ = buf.push('{');
        for (i, (key, value)) in pairs.iter().enumerate() {
            if i > 0 {
                let _ = buf.push(',');
            }
            let _ = buf.push('"');
            let _ = buf.push_str(key);
            let _ = buf.push_str("\":");
            let _ = buf.push_str(value);
        }
        let _ = buf.push('}');

        let truncated = buf.was_truncated();
        if truncated {
            warn!(needed, capacity = self.capacity, "Structured data truncated");
        } else {
            debug!(pairs = pairs.len(), len = buf.len(), "Encoded structured data");
        }

        Ok(KvPayload {
            text: buf.into_string(),
            pairs: pairs.len(),
            truncated,
        })
    }
}

fn encoded_len(pairs: &[(&str, &str)]) -> usize {
    let separators = pairs.len().saturating_sub(1);
    let body: usize = pairs
        .iter()
        // "key": + value
        .map(|(k, v)| k.len() + v.len() + 3)
        .sum();
    2 + separators + body
}
