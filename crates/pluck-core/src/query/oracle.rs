//! Row-at-a-time traversal.
//!
//! Follows every link of every path for every root row with its own point
//! fetch. Produces the same rows as [`ProjectionExecutor`] at the cost of one
//! fetch per link; used as a reference in tests and as the baseline in
//! benchmarks.
//!
//! [`ProjectionExecutor`]: super::executor::ProjectionExecutor

use super::executor::{root_columns, ProjectionQuery, ProjectionResult, ProjectionStats};
use super::path::{FieldPath, PathResolver};
use crate::catalog::SchemaBundle;
use crate::error::Error;
use crate::filter::FilterExpr;
use crate::store::{FetchRequest, Row, RowStore};
use crate::value::Value;

/// Per-row, per-link traversal over a row store.
pub struct NaiveTraversal<'a, S: RowStore + ?Sized> {
    store: &'a S,
    schema: &'a SchemaBundle,
}

impl<'a, S: RowStore + ?Sized> NaiveTraversal<'a, S> {
    /// Create a traversal over a store.
    pub fn new(store: &'a S, schema: &'a SchemaBundle) -> Self {
        Self { store, schema }
    }

    /// Project `query` one link at a time.
    pub fn project_paths(&self, query: &ProjectionQuery) -> Result<ProjectionResult, Error> {
        if query.paths.is_empty() {
            return Err(Error::InvalidPath("no paths requested".into()));
        }
        let paths = PathResolver::new(self.schema).parse_all(&query.root_entity, &query.paths)?;

        let mut request = FetchRequest::new(query.root_entity.clone(), root_columns(&paths))
            .with_order(query.order_by.clone());
        if let Some(filter) = &query.filter {
            request = request.with_filter(filter.clone());
        }
        if let Some(pagination) = query.pagination {
            request = request.with_pagination(pagination);
        }
        let root_rows = self.store.fetch_rows(&request)?;

        let mut stats = ProjectionStats {
            root_rows: root_rows.len(),
            fetches: 1,
            ..Default::default()
        };

        let mut rows = Vec::with_capacity(root_rows.len());
        for root in &root_rows {
            let mut values = Vec::with_capacity(paths.len());
            for path in &paths {
                values.push(self.walk(path, root, &mut stats)?);
            }
            rows.push(values);
        }

        Ok(ProjectionResult {
            columns: query.paths.clone(),
            rows,
            stats,
        })
    }

    fn walk(
        &self,
        path: &FieldPath,
        root: &Row,
        stats: &mut ProjectionStats,
    ) -> Result<Value, Error> {
        let mut value = root.get(path.root_column()).cloned().unwrap_or(Value::Null);

        for level in 0..path.depth() {
            if value.to_key().is_none() {
                return Ok(Value::Null);
            }
            let relation = path.relation_at(level)?;
            let identity = self.schema.primary_key(&relation.to_entity)?;
            let column = path.column_at(level).to_string();

            let request = FetchRequest::new(relation.to_entity.clone(), vec![column.clone()])
                .with_filter(FilterExpr::eq(identity, value));
            let found = self.store.fetch_rows(&request)?;
            stats.fetches += 1;
            stats.rows_fetched += found.len();

            value = match found.first().and_then(|row| row.get(&column)) {
                Some(next) => next.clone(),
                None => return Ok(Value::Null),
            };
        }

        Ok(value)
    }
}
