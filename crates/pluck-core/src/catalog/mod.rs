//! Relationship schema for pluck.
//!
//! The catalog registers entities, their fields and the relations between them.
//! Path resolution walks this metadata instead of reflecting over live types.

mod entity;
mod field;
mod relation;
mod schema;

pub use entity::EntityDef;
pub use field::{FieldDef, ScalarType};
pub use relation::{Cardinality, RelationDef};
pub use schema::SchemaBundle;
