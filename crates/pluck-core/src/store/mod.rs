//! Row store boundary.
//!
//! A [`RowStore`] serves projected rows for one entity type at a time. The
//! projection engine only ever talks to its store through [`FetchRequest`]s.

mod memory;
mod recording;

pub use memory::MemoryStore;
pub use recording::RecordingStore;

use crate::error::Error;
use crate::filter::{sort_rows, FilterEvaluator, FilterExpr, OrderSpec, Pagination};
use crate::value::Value;

/// A row: attribute name to value, in the order the store produced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a row from name/value pairs.
    pub fn from_fields(fields: Vec<(String, Value)>) -> Self {
        Self { fields }
    }

    /// Set a field, replacing any existing value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field, replacing any existing value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Get a field value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Field name/value pairs.
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    /// Consume the row into its name/value pairs.
    pub fn into_fields(self) -> Vec<(String, Value)> {
        self.fields
    }

    /// Copy of this row restricted to `names`, in that order. Missing fields
    /// become nulls.
    pub fn project(&self, names: &[String]) -> Row {
        Row {
            fields: names
                .iter()
                .map(|n| (n.clone(), self.get(n).cloned().unwrap_or(Value::Null)))
                .collect(),
        }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl AsRef<[(String, Value)]> for Row {
    fn as_ref(&self) -> &[(String, Value)] {
        &self.fields
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (name, value) in iter {
            row.set(name, value);
        }
        row
    }
}

/// One fetch issued against a row store.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    /// Entity type to read.
    pub entity: String,
    /// Fields to return, in order.
    pub fields: Vec<String>,
    /// Row filter.
    pub filter: Option<FilterExpr>,
    /// Ordering.
    pub order_by: Vec<OrderSpec>,
    /// Pagination applied after ordering.
    pub pagination: Option<Pagination>,
}

impl FetchRequest {
    /// Create a request for all rows of an entity.
    pub fn new(entity: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            entity: entity.into(),
            fields,
            filter: None,
            order_by: Vec::new(),
            pagination: None,
        }
    }

    /// Set the filter.
    pub fn with_filter(mut self, filter: FilterExpr) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set the ordering.
    pub fn with_order(mut self, order_by: Vec<OrderSpec>) -> Self {
        self.order_by = order_by;
        self
    }

    /// Set the pagination.
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

/// Source of rows for the projection engine.
///
/// Implementations must return rows of `request.entity` that match
/// `request.filter`, projected to exactly `request.fields`, ordered by
/// `request.order_by` and sliced by `request.pagination`. An `In` filter with
/// an empty value set matches nothing. Failures are reported as errors and
/// are never retried by the caller.
pub trait RowStore: Send + Sync {
    /// Fetch rows for a single request.
    fn fetch_rows(&self, request: &FetchRequest) -> Result<Vec<Row>, Error>;
}

impl<S: RowStore + ?Sized> RowStore for &S {
    fn fetch_rows(&self, request: &FetchRequest) -> Result<Vec<Row>, Error> {
        (**self).fetch_rows(request)
    }
}

impl<S: RowStore + ?Sized> RowStore for std::sync::Arc<S> {
    fn fetch_rows(&self, request: &FetchRequest) -> Result<Vec<Row>, Error> {
        (**self).fetch_rows(request)
    }
}

/// Filter, order, paginate and project candidate rows for `request`.
///
/// Ordering runs on the full rows so that order fields need not be part of
/// the projection.
pub(crate) fn finish_rows(
    candidates: impl IntoIterator<Item = Row>,
    request: &FetchRequest,
) -> Vec<Row> {
    let mut rows: Vec<Row> = match &request.filter {
        Some(filter) => candidates
            .into_iter()
            .filter(|row| FilterEvaluator::evaluate(filter, row.fields()))
            .collect(),
        None => candidates.into_iter().collect(),
    };

    sort_rows(&mut rows, &request.order_by);
    if let Some(pagination) = &request.pagination {
        pagination.apply(&mut rows);
    }

    rows.iter().map(|row| row.project(&request.fields)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_set_replaces() {
        let mut row = Row::new().with("id", 1i64).with("title", "a");
        row.set("title", "b");

        assert_eq!(row.len(), 2);
        assert_eq!(row.get("title"), Some(&Value::String("b".into())));
    }

    #[test]
    fn test_row_project_fills_nulls() {
        let row: Row = [("id", Value::Int64(1)), ("title", Value::from("T"))]
            .into_iter()
            .collect();
        let projected = row.project(&["title".to_string(), "missing".to_string()]);

        assert_eq!(projected.fields()[0].0, "title");
        assert_eq!(projected.get("missing"), Some(&Value::Null));
        assert!(projected.get("id").is_none());
    }
}
