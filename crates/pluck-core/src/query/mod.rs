//! Batched to-one projection.
//!
//! - [`path`]: parse and validate dotted attribute paths
//! - [`loader`]: fetch one batch per relation prefix, level by level
//! - [`projector`]: walk each path through the loaded tables
//! - [`executor`]: the end-to-end entry point
//! - [`oracle`]: row-at-a-time reference traversal

pub mod config;
pub mod executor;
pub mod loader;
pub mod oracle;
pub mod path;
pub mod projector;

#[cfg(test)]
pub(crate) mod testing;

pub use config::ProjectionConfig;
pub use executor::{ProjectionExecutor, ProjectionQuery, ProjectionResult, ProjectionStats};
pub use loader::{BatchStats, IndexedTable, LevelGroup, LevelLoader, LevelTables};
pub use oracle::NaiveTraversal;
pub use path::{FieldPath, PathResolver};
pub use projector::Projector;
