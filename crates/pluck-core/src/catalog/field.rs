//! Field definitions for entities.

use serde::{Deserialize, Serialize};

/// Scalar data types a field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarType {
    /// Boolean value.
    Bool,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
    /// Binary data.
    Bytes,
    /// Timestamp (microseconds since Unix epoch).
    Timestamp,
    /// UUID (128-bit identifier).
    Uuid,
}

impl ScalarType {
    /// Check if values of this type can serve as primary or foreign keys.
    pub fn is_keyable(&self) -> bool {
        matches!(
            self,
            ScalarType::Int32
                | ScalarType::Int64
                | ScalarType::String
                | ScalarType::Bytes
                | ScalarType::Uuid
        )
    }
}

/// A field definition within an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Field data type.
    pub scalar: ScalarType,
    /// Whether the field may hold nulls.
    #[serde(default)]
    pub nullable: bool,
}

impl FieldDef {
    /// Create a new non-nullable field.
    pub fn new(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self {
            name: name.into(),
            scalar,
            nullable: false,
        }
    }

    /// Create a nullable field.
    pub fn optional(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self {
            name: name.into(),
            scalar,
            nullable: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_constructors() {
        let id = FieldDef::new("id", ScalarType::Int64);
        assert!(!id.nullable);

        let post_id = FieldDef::optional("post_id", ScalarType::Int64);
        assert!(post_id.nullable);
    }

    #[test]
    fn test_keyable_types() {
        assert!(ScalarType::Uuid.is_keyable());
        assert!(ScalarType::Int32.is_keyable());
        assert!(!ScalarType::Float64.is_keyable());
        assert!(!ScalarType::Bool.is_keyable());
    }
}
