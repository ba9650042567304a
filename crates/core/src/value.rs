//! Stored values
//!
//! Records are serialized to JSON and stored as [`Value::String`]; index
//! entries use small scalar values. A [`VersionedValue`] with no value is a
//! tombstone: it marks the version at which a key was deleted.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// A value held by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Empty marker value
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    I64(i64),
    /// UTF-8 text (serialized records live here)
    String(String),
    /// Raw bytes
    Bytes(Vec<u8>),
}

impl Value {
    /// Borrow the text if this is a `String` value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the variant, for type errors
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::I64(_) => "I64",
            Value::String(_) => "String",
            Value::Bytes(_) => "Bytes",
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// One entry of a key's version chain
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedValue {
    /// The value, or `None` for a tombstone
    pub value: Option<Value>,
    /// Commit version that wrote this entry
    pub version: u64,
    /// Wall-clock time of the commit
    pub timestamp: Timestamp,
}

impl VersionedValue {
    /// A live entry
    pub fn live(value: Value, version: u64, timestamp: Timestamp) -> Self {
        Self {
            value: Some(value),
            version,
            timestamp,
        }
    }

    /// A deletion marker
    pub fn tombstone(version: u64, timestamp: Timestamp) -> Self {
        Self {
            value: None,
            version,
            timestamp,
        }
    }

    /// True if this entry records a delete
    pub fn is_tombstone(&self) -> bool {
        self.value.is_none()
    }
}
