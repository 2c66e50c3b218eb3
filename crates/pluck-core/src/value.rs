//! Runtime values and the key type used by lookup tables.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A runtime value read from or written to a row store.
///
/// The set mirrors the scalar types of the catalog. No coercion happens between
/// variants apart from the integer widening performed by [`Value::to_key`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit floating point.
    Float64(f64),
    /// UTF-8 string.
    String(String),
    /// Binary data.
    Bytes(Vec<u8>),
    /// Timestamp as microseconds since Unix epoch.
    Timestamp(i64),
    /// UUID as 16 bytes.
    Uuid([u8; 16]),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(i) => Some(*i),
            Value::Int32(i) => Some(*i as i64),
            _ => None,
        }
    }

    /// Try to get as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get as string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as UUID.
    pub fn as_uuid(&self) -> Option<&[u8; 16]> {
        match self {
            Value::Uuid(u) => Some(u),
            _ => None,
        }
    }

    /// Convert this value into a lookup key.
    ///
    /// Returns `None` for nulls and for types that have no equality/hash
    /// contract (floats, booleans). 32-bit and 64-bit integers map to the same
    /// key so that an `Int64` foreign key matches an `Int32` primary key.
    pub fn to_key(&self) -> Option<Key> {
        match self {
            Value::Int32(i) => Some(Key::Int(*i as i64)),
            Value::Int64(i) => Some(Key::Int(*i)),
            Value::String(s) => Some(Key::String(s.clone())),
            Value::Uuid(u) => Some(Key::Uuid(*u)),
            Value::Bytes(b) => Some(Key::Bytes(b.clone())),
            Value::Null | Value::Bool(_) | Value::Float64(_) | Value::Timestamp(_) => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Primary-key value with an explicit equality, hash and ordering contract.
///
/// Indexed lookup tables are keyed by `Key`. Primary-key and foreign-key
/// columns must hold integer, string, UUID or binary values.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    /// Signed integer key (32-bit values are widened).
    Int(i64),
    /// String key.
    String(String),
    /// UUID key.
    Uuid([u8; 16]),
    /// Opaque binary key.
    Bytes(Vec<u8>),
}

impl Key {
    /// Convert back into a value, used when building `IN` filters.
    pub fn to_value(&self) -> Value {
        match self {
            Key::Int(i) => Value::Int64(*i),
            Key::String(s) => Value::String(s.clone()),
            Key::Uuid(u) => Value::Uuid(*u),
            Key::Bytes(b) => Value::Bytes(b.clone()),
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{i}"),
            Key::String(s) => write!(f, "{s:?}"),
            Key::Uuid(u) => {
                let hex: String = u.iter().map(|b| format!("{:02x}", b)).collect();
                write!(f, "uuid:{hex}")
            }
            Key::Bytes(b) => {
                let hex: String = b.iter().map(|b| format!("{:02x}", b)).collect();
                write!(f, "bytes:{hex}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_keys_widen() {
        assert_eq!(Value::Int32(7).to_key(), Value::Int64(7).to_key());
        assert_eq!(Value::Int32(7).to_key(), Some(Key::Int(7)));
    }

    #[test]
    fn test_unkeyable_values() {
        assert!(Value::Null.to_key().is_none());
        assert!(Value::Float64(1.5).to_key().is_none());
        assert!(Value::Bool(true).to_key().is_none());
    }

    #[test]
    fn test_key_value_roundtrip_preserves_key() {
        let key = Key::Uuid([9; 16]);
        assert_eq!(key.to_value().to_key(), Some(key));
    }

    #[test]
    fn test_option_into_value() {
        let none: Option<i64> = None;
        assert_eq!(Value::from(none), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::String("x".into()));
    }
}
