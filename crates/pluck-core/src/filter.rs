//! Row filters, ordering and pagination.
//!
//! The root fetch of a projection honors the caller's filter, order and
//! pagination; batched fetches use a single `In` filter on the primary key.
//! Both row stores evaluate filters with [`FilterEvaluator`].

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Filter expression over the fields of a single row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterExpr {
    /// Equality.
    Eq { field: String, value: Value },
    /// Inequality.
    Ne { field: String, value: Value },
    /// Strictly less than.
    Lt { field: String, value: Value },
    /// Less than or equal.
    Le { field: String, value: Value },
    /// Strictly greater than.
    Gt { field: String, value: Value },
    /// Greater than or equal.
    Ge { field: String, value: Value },
    /// Membership in a value set.
    In { field: String, values: Vec<Value> },
    /// Non-membership in a value set.
    NotIn { field: String, values: Vec<Value> },
    /// Field is null or absent.
    IsNull { field: String },
    /// Field is present and not null.
    IsNotNull { field: String },
    /// SQL LIKE pattern match.
    Like { field: String, pattern: String },
    /// All sub-filters match.
    And(Vec<FilterExpr>),
    /// At least one sub-filter matches.
    Or(Vec<FilterExpr>),
}

impl FilterExpr {
    /// Create an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterExpr::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an inequality filter.
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterExpr::Ne {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a less-than filter.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterExpr::Lt {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a greater-than filter.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterExpr::Gt {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an IN filter.
    pub fn in_values(field: impl Into<String>, values: Vec<Value>) -> Self {
        FilterExpr::In {
            field: field.into(),
            values,
        }
    }

    /// Create an IS NULL filter.
    pub fn is_null(field: impl Into<String>) -> Self {
        FilterExpr::IsNull {
            field: field.into(),
        }
    }

    /// Create an IS NOT NULL filter.
    pub fn is_not_null(field: impl Into<String>) -> Self {
        FilterExpr::IsNotNull {
            field: field.into(),
        }
    }

    /// Create a LIKE filter.
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        FilterExpr::Like {
            field: field.into(),
            pattern: pattern.into(),
        }
    }

    /// Combine filters with AND.
    pub fn and(filters: Vec<FilterExpr>) -> Self {
        FilterExpr::And(filters)
    }

    /// Combine filters with OR.
    pub fn or(filters: Vec<FilterExpr>) -> Self {
        FilterExpr::Or(filters)
    }

    /// If this filter is exactly `field IN (...)`, return the value set.
    pub fn as_in_list(&self, field: &str) -> Option<&[Value]> {
        match self {
            FilterExpr::In { field: f, values } if f == field => Some(values),
            _ => None,
        }
    }

    /// All field names referenced by this filter.
    pub fn fields(&self) -> HashSet<String> {
        let mut fields = HashSet::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields(&self, fields: &mut HashSet<String>) {
        match self {
            FilterExpr::Eq { field, .. }
            | FilterExpr::Ne { field, .. }
            | FilterExpr::Lt { field, .. }
            | FilterExpr::Le { field, .. }
            | FilterExpr::Gt { field, .. }
            | FilterExpr::Ge { field, .. }
            | FilterExpr::In { field, .. }
            | FilterExpr::NotIn { field, .. }
            | FilterExpr::IsNull { field }
            | FilterExpr::IsNotNull { field }
            | FilterExpr::Like { field, .. } => {
                fields.insert(field.clone());
            }
            FilterExpr::And(filters) | FilterExpr::Or(filters) => {
                for f in filters {
                    f.collect_fields(fields);
                }
            }
        }
    }
}

/// Order specification for sorting results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpec {
    /// Field to order by.
    pub field: String,
    /// Sort direction.
    pub direction: OrderDirection,
}

impl OrderSpec {
    /// Create an ascending order spec.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: OrderDirection::Asc,
        }
    }

    /// Create a descending order spec.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: OrderDirection::Desc,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

/// Limit/offset pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of results to return.
    pub limit: u32,
    /// Number of results to skip.
    pub offset: u32,
}

impl Pagination {
    /// Create pagination with limit and offset.
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    /// Create pagination with just a limit.
    pub fn limit(limit: u32) -> Self {
        Self { limit, offset: 0 }
    }

    /// Apply this pagination to an ordered list in place.
    pub fn apply<T>(&self, rows: &mut Vec<T>) {
        let offset = self.offset as usize;
        if offset >= rows.len() {
            rows.clear();
            return;
        }
        rows.drain(0..offset);
        rows.truncate(self.limit as usize);
    }
}

/// Evaluates filter expressions against row data.
pub struct FilterEvaluator;

impl FilterEvaluator {
    /// Evaluate a filter expression against a row of field values.
    pub fn evaluate(filter: &FilterExpr, row: &[(String, Value)]) -> bool {
        match filter {
            FilterExpr::Eq { field, value } => {
                Self::compare_field(row, field, value, Self::values_equal)
            }
            FilterExpr::Ne { field, value } => {
                Self::compare_field(row, field, value, |a, b| !Self::values_equal(a, b))
            }
            FilterExpr::Lt { field, value } => Self::compare_field(row, field, value, |a, b| {
                Self::compare_values(a, b).is_some_and(|ord| ord.is_lt())
            }),
            FilterExpr::Le { field, value } => Self::compare_field(row, field, value, |a, b| {
                Self::compare_values(a, b).is_some_and(|ord| ord.is_le())
            }),
            FilterExpr::Gt { field, value } => Self::compare_field(row, field, value, |a, b| {
                Self::compare_values(a, b).is_some_and(|ord| ord.is_gt())
            }),
            FilterExpr::Ge { field, value } => Self::compare_field(row, field, value, |a, b| {
                Self::compare_values(a, b).is_some_and(|ord| ord.is_ge())
            }),
            FilterExpr::In { field, values } => match Self::get_field_value(row, field) {
                Some(fv) => values.iter().any(|v| Self::values_equal(fv, v)),
                None => false,
            },
            FilterExpr::NotIn { field, values } => match Self::get_field_value(row, field) {
                Some(fv) => !values.iter().any(|v| Self::values_equal(fv, v)),
                None => true,
            },
            FilterExpr::IsNull { field } => {
                matches!(Self::get_field_value(row, field), None | Some(Value::Null))
            }
            FilterExpr::IsNotNull { field } => {
                !matches!(Self::get_field_value(row, field), None | Some(Value::Null))
            }
            FilterExpr::Like { field, pattern } => match Self::get_field_value(row, field) {
                Some(Value::String(s)) => Self::like_match(s, pattern),
                _ => false,
            },
            FilterExpr::And(filters) => filters.iter().all(|f| Self::evaluate(f, row)),
            FilterExpr::Or(filters) => filters.iter().any(|f| Self::evaluate(f, row)),
        }
    }

    fn get_field_value<'a>(row: &'a [(String, Value)], field: &str) -> Option<&'a Value> {
        row.iter().find(|(name, _)| name == field).map(|(_, v)| v)
    }

    fn compare_field<F>(row: &[(String, Value)], field: &str, value: &Value, comparator: F) -> bool
    where
        F: FnOnce(&Value, &Value) -> bool,
    {
        match Self::get_field_value(row, field) {
            Some(fv) => comparator(fv, value),
            None => false,
        }
    }

    /// Check if two values are equal, widening integers.
    pub fn values_equal(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Int32(a), Value::Int64(b)) => (*a as i64) == *b,
            (Value::Int64(a), Value::Int32(b)) => *a == (*b as i64),
            _ => a == b,
        }
    }

    /// Compare two values, returning their ordering if comparable.
    pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
        match (a, b) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int32(a), Value::Int32(b)) => Some(a.cmp(b)),
            (Value::Int64(a), Value::Int64(b)) => Some(a.cmp(b)),
            (Value::Int32(a), Value::Int64(b)) => Some((*a as i64).cmp(b)),
            (Value::Int64(a), Value::Int32(b)) => Some(a.cmp(&(*b as i64))),
            (Value::Float64(a), Value::Float64(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Some(a.cmp(b)),
            (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Match a string against a SQL LIKE pattern (`%`, `_` and `\` escapes).
    pub fn like_match(value: &str, pattern: &str) -> bool {
        let value: Vec<char> = value.chars().collect();
        let pattern: Vec<char> = pattern.chars().collect();
        Self::like_match_from(&value, &pattern)
    }

    fn like_match_from(value: &[char], pattern: &[char]) -> bool {
        match pattern.first() {
            None => value.is_empty(),
            Some('%') => {
                let rest = &pattern[1..];
                (0..=value.len()).any(|skip| Self::like_match_from(&value[skip..], rest))
            }
            Some('_') => !value.is_empty() && Self::like_match_from(&value[1..], &pattern[1..]),
            Some('\\') => match (pattern.get(1), value.first()) {
                (Some(p), Some(c)) if p == c => Self::like_match_from(&value[1..], &pattern[2..]),
                _ => false,
            },
            Some(p) => {
                value.first() == Some(p) && Self::like_match_from(&value[1..], &pattern[1..])
            }
        }
    }
}

/// Sort rows according to order specifications. Nulls sort first.
pub fn sort_rows<R: AsRef<[(String, Value)]>>(rows: &mut [R], order_by: &[OrderSpec]) {
    if order_by.is_empty() {
        return;
    }

    rows.sort_by(|a, b| {
        for spec in order_by {
            let a_val = a.as_ref().iter().find(|(n, _)| n == &spec.field).map(|(_, v)| v);
            let b_val = b.as_ref().iter().find(|(n, _)| n == &spec.field).map(|(_, v)| v);

            let cmp = match (a_val, b_val) {
                (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
                (None | Some(Value::Null), _) => Ordering::Less,
                (_, None | Some(Value::Null)) => Ordering::Greater,
                (Some(av), Some(bv)) => {
                    FilterEvaluator::compare_values(av, bv).unwrap_or(Ordering::Equal)
                }
            };

            let cmp = match spec.direction {
                OrderDirection::Asc => cmp,
                OrderDirection::Desc => cmp.reverse(),
            };

            if cmp != Ordering::Equal {
                return cmp;
            }
        }
        Ordering::Equal
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_row(fields: Vec<(&str, Value)>) -> Vec<(String, Value)> {
        fields.into_iter().map(|(n, v)| (n.to_string(), v)).collect()
    }

    #[test]
    fn test_eq_filter() {
        let row = make_row(vec![
            ("name", Value::String("Alice".into())),
            ("age", Value::Int32(30)),
        ]);

        assert!(FilterEvaluator::evaluate(&FilterExpr::eq("name", "Alice"), &row));
        assert!(!FilterEvaluator::evaluate(&FilterExpr::eq("name", "Bob"), &row));
        assert!(FilterEvaluator::evaluate(&FilterExpr::eq("age", 30i64), &row));
    }

    #[test]
    fn test_comparison_filters() {
        let row = make_row(vec![("score", Value::Int32(75))]);

        assert!(FilterEvaluator::evaluate(&FilterExpr::gt("score", 50), &row));
        assert!(!FilterEvaluator::evaluate(&FilterExpr::lt("score", 50), &row));
        assert!(!FilterEvaluator::evaluate(&FilterExpr::gt("missing", 50), &row));
    }

    #[test]
    fn test_in_and_null_filters() {
        let row = make_row(vec![("id", Value::Int64(3)), ("post_id", Value::Null)]);

        let filter = FilterExpr::in_values("id", vec![Value::Int32(1), Value::Int32(3)]);
        assert!(FilterEvaluator::evaluate(&filter, &row));

        let filter = FilterExpr::in_values("id", vec![]);
        assert!(!FilterEvaluator::evaluate(&filter, &row));

        assert!(FilterEvaluator::evaluate(&FilterExpr::is_null("post_id"), &row));
        assert!(FilterEvaluator::evaluate(&FilterExpr::is_null("absent"), &row));
        assert!(FilterEvaluator::evaluate(&FilterExpr::is_not_null("id"), &row));
    }

    #[test]
    fn test_compound_filters() {
        let row = make_row(vec![("a", Value::Int64(1)), ("b", Value::Int64(2))]);

        let both = FilterExpr::and(vec![FilterExpr::eq("a", 1i64), FilterExpr::eq("b", 2i64)]);
        assert!(FilterEvaluator::evaluate(&both, &row));

        let either = FilterExpr::or(vec![FilterExpr::eq("a", 9i64), FilterExpr::eq("b", 2i64)]);
        assert!(FilterEvaluator::evaluate(&either, &row));

        let neither = FilterExpr::or(vec![FilterExpr::eq("a", 9i64), FilterExpr::eq("b", 9i64)]);
        assert!(!FilterEvaluator::evaluate(&neither, &row));
    }

    #[test]
    fn test_like_match() {
        assert!(FilterEvaluator::like_match("hello world", "hello%"));
        assert!(FilterEvaluator::like_match("hello world", "%world"));
        assert!(FilterEvaluator::like_match("hello", "h_llo"));
        assert!(FilterEvaluator::like_match("100%", "100\\%"));
        assert!(!FilterEvaluator::like_match("hello", "h_lo"));
        assert!(!FilterEvaluator::like_match("100x", "100\\%"));
    }

    #[test]
    fn test_as_in_list() {
        let filter = FilterExpr::in_values("id", vec![Value::Int64(1)]);
        assert_eq!(filter.as_in_list("id").map(|v| v.len()), Some(1));
        assert!(filter.as_in_list("other").is_none());
        assert!(FilterExpr::eq("id", 1i64).as_in_list("id").is_none());
    }

    #[test]
    fn test_sort_rows_nulls_first() {
        let mut rows = vec![
            make_row(vec![("n", Value::Int64(2))]),
            make_row(vec![("n", Value::Null)]),
            make_row(vec![("n", Value::Int64(1))]),
        ];

        sort_rows(&mut rows, &[OrderSpec::asc("n")]);
        assert_eq!(rows[0][0].1, Value::Null);
        assert_eq!(rows[1][0].1, Value::Int64(1));

        sort_rows(&mut rows, &[OrderSpec::desc("n")]);
        assert_eq!(rows[0][0].1, Value::Int64(2));
        assert_eq!(rows[2][0].1, Value::Null);
    }

    #[test]
    fn test_pagination() {
        let mut rows: Vec<u32> = (0..10).collect();
        Pagination::new(3, 2).apply(&mut rows);
        assert_eq!(rows, vec![2, 3, 4]);

        let mut rows: Vec<u32> = (0..3).collect();
        Pagination::new(5, 5).apply(&mut rows);
        assert!(rows.is_empty());
    }
}
