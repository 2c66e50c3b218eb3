//! Assembles output rows from root rows and loaded tables.

use super::loader::LevelTables;
use super::path::FieldPath;
use crate::store::Row;
use crate::value::Value;

/// Walks each path through the indexed tables.
///
/// A null link, a non-key value or a key with no matching row ends the walk
/// with `Value::Null`. Broken links are never errors.
pub struct Projector;

impl Projector {
    /// One output row per root row (same order), one value per path (request
    /// order).
    pub fn project(
        paths: &[FieldPath],
        root_rows: &[Row],
        tables: &LevelTables,
    ) -> Vec<Vec<Value>> {
        root_rows
            .iter()
            .map(|row| {
                paths
                    .iter()
                    .map(|path| Self::project_value(path, row, tables))
                    .collect()
            })
            .collect()
    }

    /// Value of a single path for a single root row.
    pub fn project_value(path: &FieldPath, root_row: &Row, tables: &LevelTables) -> Value {
        let mut value = match root_row.get(path.root_column()) {
            Some(value) => value,
            None => return Value::Null,
        };

        for level in 0..path.depth() {
            let Some(key) = value.to_key() else {
                return Value::Null;
            };
            let Some(row) = tables.lookup(&path.prefix(level), &key) else {
                return Value::Null;
            };
            value = match row.get(path.column_at(level)) {
                Some(value) => value,
                None => return Value::Null,
            };
        }

        value.clone()
    }
}
