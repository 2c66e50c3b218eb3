//! Benchmark harness helpers.
//!
//! A [`TestContext`] holds the same generated blog graph in an in-memory
//! store and in a temporary sled store.

use pluck_core::catalog::SchemaBundle;
use pluck_core::query::{NaiveTraversal, ProjectionExecutor};
use pluck_core::storage::{SledStore, StorageConfig};
use pluck_core::store::MemoryStore;
use pluck_core::Error;
use tracing::info;

use crate::fixtures::{blog_schema, generate_blog, BlogData, Scale};

/// Populated stores for one benchmark scale.
pub struct TestContext {
    pub schema: SchemaBundle,
    pub memory: MemoryStore,
    pub sled: SledStore,
    _storage_dir: tempfile::TempDir,
}

impl TestContext {
    /// Create empty stores with the blog schema.
    pub fn new() -> Result<Self, Error> {
        let storage_dir = tempfile::tempdir().map_err(|e| Error::Internal(e.to_string()))?;
        let schema = blog_schema();
        let sled = SledStore::open(StorageConfig::new(storage_dir.path()), schema.clone())?;

        Ok(Self {
            schema,
            memory: MemoryStore::new(),
            sled,
            _storage_dir: storage_dir,
        })
    }

    /// Create stores populated with the blog graph at `scale`.
    pub fn with_scale(scale: Scale) -> Result<Self, Error> {
        let ctx = Self::new()?;
        let data = generate_blog(scale);
        populate(&ctx, &data)?;
        info!(?scale, rows = data.len(), "benchmark stores populated");
        Ok(ctx)
    }

    /// Batched executor over the in-memory store.
    pub fn executor(&self) -> ProjectionExecutor<'_, MemoryStore> {
        ProjectionExecutor::new(&self.memory, &self.schema)
    }

    /// Batched executor over the sled store.
    pub fn sled_executor(&self) -> ProjectionExecutor<'_, SledStore> {
        ProjectionExecutor::new(&self.sled, &self.schema)
    }

    /// Row-at-a-time traversal over the in-memory store.
    pub fn naive(&self) -> NaiveTraversal<'_, MemoryStore> {
        NaiveTraversal::new(&self.memory, &self.schema)
    }
}

/// Insert generated rows into both stores.
pub fn populate(ctx: &TestContext, data: &BlogData) -> Result<(), Error> {
    for (entity, rows) in data.tables() {
        ctx.memory.insert_many(entity, rows.iter().cloned());
        ctx.sled.insert_many(entity, rows)?;
    }
    ctx.sled.flush()
}

/// Install a `tracing` subscriber honoring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
