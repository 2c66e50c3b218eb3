//! In-memory row store.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::{finish_rows, FetchRequest, Row, RowStore};
use crate::error::Error;

/// Row store keeping every entity's rows in insertion order.
///
/// Rows are cloned out on every fetch, so concurrent projections never observe
/// a partially inserted row.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Row>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row to an entity's table.
    pub fn insert(&self, entity: impl Into<String>, row: Row) {
        self.tables.write().entry(entity.into()).or_default().push(row);
    }

    /// Append many rows to an entity's table.
    pub fn insert_many(&self, entity: impl Into<String>, rows: impl IntoIterator<Item = Row>) {
        self.tables
            .write()
            .entry(entity.into())
            .or_default()
            .extend(rows);
    }

    /// Number of rows stored for an entity.
    pub fn count(&self, entity: &str) -> usize {
        self.tables.read().get(entity).map_or(0, Vec::len)
    }
}

impl RowStore for MemoryStore {
    fn fetch_rows(&self, request: &FetchRequest) -> Result<Vec<Row>, Error> {
        let tables = self.tables.read();
        let rows = match tables.get(&request.entity) {
            Some(rows) => finish_rows(rows.iter().cloned(), request),
            None => Vec::new(),
        };
        Ok(rows)
    }
}
