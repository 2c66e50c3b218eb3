//! Core error types.

use thiserror::Error;

use crate::catalog::Cardinality;

/// Errors raised while resolving paths, fetching rows or projecting values.
///
/// Every variant is fatal to the invocation that produced it: a projection
/// either returns all of its rows or none.
#[derive(Debug, Error)]
pub enum Error {
    /// A path traverses a relation that is not to-one.
    #[error("relation '{relation}' on '{entity}' is {cardinality:?}, not a to-one relation")]
    UnsupportedRelationKind {
        entity: String,
        relation: String,
        cardinality: Cardinality,
    },

    /// Entity type is not registered in the schema.
    #[error("unknown entity '{0}'")]
    UnknownEntity(String),

    /// Relation name does not exist on the entity.
    #[error("unknown relation '{relation}' on '{entity}'")]
    UnknownRelation { entity: String, relation: String },

    /// Terminal attribute does not exist on the entity.
    #[error("unknown field '{field}' on '{entity}'")]
    UnknownField { entity: String, field: String },

    /// Malformed path specification.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A link column holds a value that cannot act as a key.
    #[error("field '{field}' on '{entity}' holds a value that cannot be used as a key")]
    InvalidKey { entity: String, field: String },

    /// A configured projection limit was exceeded.
    #[error("budget exceeded: {0}")]
    BudgetExceeded(String),

    /// The row store failed to serve a fetch.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// Storage layer error.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Invalid data format.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Internal consistency fault.
    #[error("internal error: {0}")]
    Internal(String),
}
