//! Pluck Core - batched to-one projection over a row store.
//!
//! Given root rows of one entity type and a list of dotted attribute paths
//! (`"text"`, `"post.title"`, `"post.user.company.name"`), the executor returns
//! one value per path per root row. Related rows are loaded with one fetch per
//! distinct relation prefix, so the number of fetches does not grow with the
//! number of root rows.

pub mod catalog;
pub mod error;
pub mod filter;
pub mod query;
pub mod storage;
pub mod store;
pub mod value;

pub use catalog::{Cardinality, EntityDef, FieldDef, RelationDef, ScalarType, SchemaBundle};
pub use error::Error;
pub use filter::{FilterEvaluator, FilterExpr, OrderDirection, OrderSpec, Pagination};
pub use query::{
    FieldPath, LevelLoader, LevelTables, NaiveTraversal, PathResolver, ProjectionConfig,
    ProjectionExecutor, ProjectionQuery, ProjectionResult, ProjectionStats, Projector,
};
pub use storage::{SledStore, StorageConfig};
pub use store::{FetchRequest, MemoryStore, RecordingStore, Row, RowStore};
pub use value::{Key, Value};
