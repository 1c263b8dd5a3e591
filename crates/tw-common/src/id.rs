//! Tag identity types.
//!
//! A tag is identified on the wire by the code the reader reports (EPC or
//! similar), and inside a registry by the sequence number it was admitted
//! under.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Registry-assigned admission number.
///
/// Assigned once per admitted tag, strictly increasing, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceId(pub u64);

impl SequenceId {
    /// The id following this one.
    pub fn next(self) -> Self {
        SequenceId(self.0 + 1)
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SequenceId {
    fn from(id: u64) -> Self {
        SequenceId(id)
    }
}

/// Tag code as reported by the reader, taken verbatim.
///
/// No normalisation is applied: two encodings of the same physical tag are
/// two different identifiers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(pub String);

impl TagId {
    pub fn new(code: impl Into<String>) -> Self {
        TagId(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TagId {
    fn from(code: &str) -> Self {
        TagId(code.to_string())
    }
}

impl From<String> for TagId {
    fn from(code: String) -> Self {
        TagId(code)
    }
}

impl Borrow<str> for TagId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
