//! Projection executor: the public entry point.
//!
//! A projection runs in three steps:
//! 1. resolve every requested path against the schema (no fetch happens if
//!    any path is invalid),
//! 2. fetch the root rows, then one batch per relation prefix,
//! 3. walk each path through the loaded tables.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::config::ProjectionConfig;
use super::loader::{BatchStats, LevelLoader};
use super::path::{FieldPath, PathResolver};
use super::projector::Projector;
use crate::catalog::SchemaBundle;
use crate::error::Error;
use crate::filter::{FilterExpr, OrderSpec, Pagination};
use crate::store::{FetchRequest, Row, RowStore};
use crate::value::Value;

/// A projection request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionQuery {
    /// Entity type of the root rows.
    pub root_entity: String,
    /// Path specs, in output column order.
    pub paths: Vec<String>,
    /// Filter on root rows.
    #[serde(default)]
    pub filter: Option<FilterExpr>,
    /// Ordering of root rows.
    #[serde(default)]
    pub order_by: Vec<OrderSpec>,
    /// Pagination of root rows.
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl ProjectionQuery {
    /// Create a query over all rows of `root_entity`.
    pub fn new(root_entity: impl Into<String>) -> Self {
        Self {
            root_entity: root_entity.into(),
            paths: Vec::new(),
            filter: None,
            order_by: Vec::new(),
            pagination: None,
        }
    }

    /// Append one path.
    pub fn select(mut self, path: impl Into<String>) -> Self {
        self.paths.push(path.into());
        self
    }

    /// Append several paths.
    pub fn select_all<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Filter root rows.
    pub fn with_filter(mut self, filter: FilterExpr) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Order root rows.
    pub fn with_order(mut self, order: OrderSpec) -> Self {
        self.order_by.push(order);
        self
    }

    /// Paginate root rows.
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

/// Counters gathered while projecting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionStats {
    /// Root rows returned by the root fetch.
    pub root_rows: usize,
    /// Fetches issued, the root fetch included.
    pub fetches: usize,
    /// Rows returned by batched relation fetches.
    pub rows_fetched: usize,
    /// One entry per prefix group, in load order.
    pub batches: Vec<BatchStats>,
}

/// Projected rows plus the column names they were requested under.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionResult {
    /// Path specs, one per column.
    pub columns: Vec<String>,
    /// One row per root row, one value per column.
    pub rows: Vec<Vec<Value>>,
    /// Fetch statistics.
    pub stats: ProjectionStats,
}

impl ProjectionResult {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if no rows were projected.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by path spec.
    pub fn column_index(&self, path: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == path)
    }

    /// Value at `row` for the given path spec.
    pub fn get(&self, row: usize, path: &str) -> Option<&Value> {
        let column = self.column_index(path)?;
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Values of one column, in row order.
    pub fn column(&self, path: &str) -> Option<Vec<&Value>> {
        let column = self.column_index(path)?;
        Some(self.rows.iter().filter_map(|r| r.get(column)).collect())
    }
}

/// Runs projections against a row store.
pub struct ProjectionExecutor<'a, S: RowStore + ?Sized> {
    store: &'a S,
    schema: &'a SchemaBundle,
    config: ProjectionConfig,
}

impl<'a, S: RowStore + ?Sized> ProjectionExecutor<'a, S> {
    /// Create an executor without limits.
    pub fn new(store: &'a S, schema: &'a SchemaBundle) -> Self {
        Self::with_config(store, schema, ProjectionConfig::default())
    }

    /// Create an executor with custom limits.
    pub fn with_config(store: &'a S, schema: &'a SchemaBundle, config: ProjectionConfig) -> Self {
        Self {
            store,
            schema,
            config,
        }
    }

    /// The limits this executor enforces.
    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Project every path for every root row matching the query.
    ///
    /// Fetches issued: one for the root rows plus one per distinct relation
    /// prefix with a non-empty key set, regardless of the number of root rows.
    #[instrument(skip_all, fields(root = %query.root_entity, paths = query.paths.len()))]
    pub fn project_paths(&self, query: &ProjectionQuery) -> Result<ProjectionResult, Error> {
        let paths = self.resolve(query)?;

        let root_rows = self.fetch_roots(query, &paths)?;
        self.config.check_root_rows(root_rows.len())?;

        let tables = LevelLoader::with_config(self.store, self.schema, self.config)
            .load(&paths, &root_rows)?;
        let rows = Projector::project(&paths, &root_rows, &tables);

        let stats = ProjectionStats {
            root_rows: root_rows.len(),
            fetches: 1 + tables.fetch_count(),
            rows_fetched: tables.rows_fetched(),
            batches: tables.batches().to_vec(),
        };
        debug!(
            rows = rows.len(),
            fetches = stats.fetches,
            rows_fetched = stats.rows_fetched,
            "projection complete"
        );

        Ok(ProjectionResult {
            columns: query.paths.clone(),
            rows,
            stats,
        })
    }

    /// Resolve and budget-check every path before anything is fetched.
    fn resolve(&self, query: &ProjectionQuery) -> Result<Vec<FieldPath>, Error> {
        if query.paths.is_empty() {
            return Err(Error::InvalidPath("no paths requested".into()));
        }

        let paths = PathResolver::new(self.schema).parse_all(&query.root_entity, &query.paths)?;
        for path in &paths {
            self.config.check_depth(&path.spec(), path.depth())?;
        }
        Ok(paths)
    }

    fn fetch_roots(
        &self,
        query: &ProjectionQuery,
        paths: &[FieldPath],
    ) -> Result<Vec<Row>, Error> {
        let fields = root_columns(paths);
        let mut request = FetchRequest::new(query.root_entity.clone(), fields)
            .with_order(query.order_by.clone());
        if let Some(filter) = &query.filter {
            request = request.with_filter(filter.clone());
        }
        if let Some(pagination) = query.pagination {
            request = request.with_pagination(pagination);
        }

        self.store.fetch_rows(&request)
    }
}

/// Columns the root fetch must return, deduplicated in path order.
pub fn root_columns(paths: &[FieldPath]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::with_capacity(paths.len());
    for path in paths {
        let column = path.root_column();
        if !columns.iter().any(|c| c == column) {
            columns.push(column.to_string());
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::testing::{blog_schema, blog_store};
    use crate::store::RecordingStore;

    #[test]
    fn test_root_columns_dedup() {
        let schema = blog_schema();
        let paths = PathResolver::new(&schema)
            .parse_all("Comment", &["post.title", "text", "post.user.name", "id"])
            .unwrap();
        assert_eq!(root_columns(&paths), vec!["post_id", "text", "id"]);
    }

    #[test]
    fn test_project_with_filter_order_and_pagination() {
        let schema = blog_schema();
        let store = RecordingStore::new(blog_store());
        let executor = ProjectionExecutor::new(&store, &schema);

        let query = ProjectionQuery::new("Comment")
            .select_all(["text", "post.user.name"])
            .with_filter(FilterExpr::is_not_null("post_id"))
            .with_order(OrderSpec::desc("id"))
            .with_pagination(Pagination::new(3, 1));
        let result = executor.project_paths(&query).unwrap();

        // ids 5, 4, 3 after skipping 6
        assert_eq!(
            result.rows,
            vec![
                vec![Value::from("e"), Value::from("alice")],
                vec![Value::from("d"), Value::Null],
                vec![Value::from("c"), Value::from("bob")],
            ]
        );
        assert_eq!(result.stats.fetches, 3);
        assert_eq!(store.fetch_count(), 3);
        assert_eq!(result.get(2, "post.user.name"), Some(&Value::from("bob")));
    }

    #[test]
    fn test_invalid_path_fetches_nothing() {
        let schema = blog_schema();
        let store = RecordingStore::new(blog_store());
        let executor = ProjectionExecutor::new(&store, &schema);

        let query = ProjectionQuery::new("Comment").select_all(["text", "post.comments.text"]);
        assert!(matches!(
            executor.project_paths(&query),
            Err(Error::UnsupportedRelationKind { .. })
        ));
        assert_eq!(store.fetch_count(), 0);
    }

    #[test]
    fn test_empty_path_list_is_rejected() {
        let schema = blog_schema();
        let store = blog_store();
        let query = ProjectionQuery::new("Comment");

        assert!(matches!(
            ProjectionExecutor::new(&store, &schema).project_paths(&query),
            Err(Error::InvalidPath(_))
        ));
    }

    #[test]
    fn test_budgets() {
        let schema = blog_schema();
        let store = RecordingStore::new(blog_store());

        let shallow = ProjectionConfig::default().with_max_depth(1);
        let query = ProjectionQuery::new("Comment").select("post.user.name");
        assert!(matches!(
            ProjectionExecutor::with_config(&store, &schema, shallow).project_paths(&query),
            Err(Error::BudgetExceeded(_))
        ));
        assert_eq!(store.fetch_count(), 0);

        let few_roots = ProjectionConfig::default().with_max_root_rows(2);
        assert!(matches!(
            ProjectionExecutor::with_config(&store, &schema, few_roots).project_paths(&query),
            Err(Error::BudgetExceeded(_))
        ));
    }

    #[test]
    fn test_query_json_roundtrip() {
        let query = ProjectionQuery::new("Comment")
            .select("post.title")
            .with_filter(FilterExpr::eq("id", 1i64));
        let json = serde_json::to_string(&query).unwrap();
        let parsed: ProjectionQuery = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, query);

        let minimal: ProjectionQuery =
            serde_json::from_str(r#"{"root_entity":"Post","paths":["title"]}"#).unwrap();
        assert!(minimal.filter.is_none());
        assert!(minimal.order_by.is_empty());
    }
}
