//! Level-by-level batched loading of related rows.
//!
//! At every level the nested paths are grouped by the relation chain they
//! share so far (their prefix). Each group issues exactly one fetch for all
//! the distinct foreign keys found in the previous level's rows, and the
//! result is indexed by primary key for the projector.
//!
//! Fetch count is `number of distinct prefixes`, independent of how many root
//! rows are being projected.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use tracing::{debug, instrument, trace};

use super::config::ProjectionConfig;
use super::path::FieldPath;
use crate::catalog::{RelationDef, SchemaBundle};
use crate::error::Error;
use crate::filter::FilterExpr;
use crate::store::{FetchRequest, Row, RowStore};
use crate::value::{Key, Value};

/// Rows of one target entity indexed by primary key.
pub type IndexedTable = HashMap<Key, Row>;

/// Outcome of one prefix group's fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchStats {
    /// Relation chain the batch was loaded for.
    pub prefix: String,
    /// Level (0 = first hop).
    pub level: usize,
    /// Target entity type.
    pub entity: String,
    /// Distinct keys requested.
    pub keys: usize,
    /// Rows returned by the store.
    pub rows: usize,
    /// False if the key set was empty and no fetch was issued.
    pub fetched: bool,
}

/// Indexed tables keyed by prefix, plus per-batch statistics.
#[derive(Debug, Default)]
pub struct LevelTables {
    tables: HashMap<String, IndexedTable>,
    batches: Vec<BatchStats>,
}

impl LevelTables {
    /// Table loaded for a prefix.
    pub fn get(&self, prefix: &str) -> Option<&IndexedTable> {
        self.tables.get(prefix)
    }

    /// Row with primary key `key` in the table for `prefix`.
    pub fn lookup(&self, prefix: &str, key: &Key) -> Option<&Row> {
        self.tables.get(prefix).and_then(|table| table.get(key))
    }

    /// Check if a table was recorded for a prefix.
    pub fn contains(&self, prefix: &str) -> bool {
        self.tables.contains_key(prefix)
    }

    /// Number of recorded tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if no tables were recorded.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Recorded prefixes, sorted.
    pub fn prefixes(&self) -> Vec<&str> {
        let mut prefixes: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        prefixes.sort_unstable();
        prefixes
    }

    /// Per-group statistics in load order.
    pub fn batches(&self) -> &[BatchStats] {
        &self.batches
    }

    /// Number of fetches actually issued.
    pub fn fetch_count(&self) -> usize {
        self.batches.iter().filter(|b| b.fetched).count()
    }

    /// Total rows returned by all batched fetches.
    pub fn rows_fetched(&self) -> usize {
        self.batches.iter().map(|b| b.rows).sum()
    }

    fn record(&mut self, table: IndexedTable, stats: BatchStats) {
        self.tables.insert(stats.prefix.clone(), table);
        self.batches.push(stats);
    }
}

/// Nested paths sharing one prefix at one level.
#[derive(Debug)]
pub struct LevelGroup<'p> {
    /// Shared relation chain, e.g. `post.user`.
    pub prefix: String,
    /// Level of the last hop in the prefix.
    pub level: usize,
    /// Relation crossed at `level`.
    pub relation: &'p RelationDef,
    /// Paths in the group, in request order.
    pub members: Vec<&'p FieldPath>,
}

impl LevelGroup<'_> {
    /// Columns the group needs from the target entity, deduplicated in order of
    /// first appearance.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for path in &self.members {
            let column = path.column_at(self.level);
            if !columns.iter().any(|c| c == column) {
                columns.push(column.to_string());
            }
        }
        columns
    }

    /// Prefix of the parent group, `None` at level 0.
    fn parent_prefix(&self) -> Option<String> {
        match (self.level, self.members.first()) {
            (0, _) | (_, None) => None,
            (level, Some(path)) => Some(path.prefix(level - 1)),
        }
    }
}

/// Group the paths still nested at `level` by their prefix.
///
/// Groups come back sorted by prefix. Every member of a group must resolve to
/// the same relation at `level`.
pub fn group_level(paths: &[FieldPath], level: usize) -> Result<Vec<LevelGroup<'_>>, Error> {
    let mut groups: BTreeMap<String, LevelGroup<'_>> = BTreeMap::new();

    for path in paths.iter().filter(|p| p.is_nested(level)) {
        let relation = path.relation_at(level)?;
        match groups.entry(path.prefix(level)) {
            Entry::Occupied(mut entry) => {
                let group = entry.get_mut();
                if group.relation != relation {
                    return Err(Error::Internal(format!(
                        "paths sharing prefix '{}' resolve to different relations",
                        group.prefix
                    )));
                }
                group.members.push(path);
            }
            Entry::Vacant(entry) => {
                let prefix = entry.key().clone();
                entry.insert(LevelGroup {
                    prefix,
                    level,
                    relation,
                    members: vec![path],
                });
            }
        }
    }

    Ok(groups.into_values().collect())
}

/// Distinct keys found at `field` across `rows`, sorted.
///
/// Absent values and values that cannot act as a key (null, float, bool,
/// timestamp) are broken links and are skipped.
pub fn collect_keys<'r>(rows: impl IntoIterator<Item = &'r Row>, field: &str) -> Vec<Key> {
    let mut keys: Vec<Key> = rows
        .into_iter()
        .filter_map(|row| row.get(field).and_then(Value::to_key))
        .collect();
    keys.sort_unstable();
    keys.dedup();
    keys
}

/// Loads one indexed table per prefix group, level by level.
pub struct LevelLoader<'a, S: RowStore + ?Sized> {
    store: &'a S,
    schema: &'a SchemaBundle,
    config: ProjectionConfig,
}

impl<'a, S: RowStore + ?Sized> LevelLoader<'a, S> {
    /// Create a loader without limits.
    pub fn new(store: &'a S, schema: &'a SchemaBundle) -> Self {
        Self::with_config(store, schema, ProjectionConfig::default())
    }

    /// Create a loader with custom limits.
    pub fn with_config(store: &'a S, schema: &'a SchemaBundle, config: ProjectionConfig) -> Self {
        Self {
            store,
            schema,
            config,
        }
    }

    /// Load every table the paths need, starting from `root_rows`.
    ///
    /// `root_rows` must carry the first foreign key of every nested path.
    /// A level's tables are complete before the next level starts.
    #[instrument(skip_all, fields(paths = paths.len(), roots = root_rows.len()))]
    pub fn load(&self, paths: &[FieldPath], root_rows: &[Row]) -> Result<LevelTables, Error> {
        let max_depth = paths.iter().map(FieldPath::depth).max().unwrap_or(0);
        let mut tables = LevelTables::default();
        let mut fetched_rows = 0usize;

        for level in 0..max_depth {
            let groups = group_level(paths, level)?;
            let mut loaded = Vec::with_capacity(groups.len());

            for group in &groups {
                let keys = self.source_keys(group, root_rows, &tables)?;
                let (table, stats) = self.fetch_group(group, keys)?;

                fetched_rows += stats.rows;
                self.config.check_fetched_rows(fetched_rows)?;
                loaded.push((table, stats));
            }

            debug!(level, groups = loaded.len(), "level loaded");
            for (table, stats) in loaded {
                tables.record(table, stats);
            }
        }

        Ok(tables)
    }

    fn source_keys(
        &self,
        group: &LevelGroup<'_>,
        root_rows: &[Row],
        tables: &LevelTables,
    ) -> Result<Vec<Key>, Error> {
        let field = &group.relation.foreign_key;
        match group.parent_prefix() {
            None => Ok(collect_keys(root_rows, field)),
            Some(parent) => {
                let source = tables.get(&parent).ok_or_else(|| {
                    Error::Internal(format!(
                        "table for '{}' missing while loading '{}'",
                        parent, group.prefix
                    ))
                })?;
                Ok(collect_keys(source.values(), field))
            }
        }
    }

    fn fetch_group(
        &self,
        group: &LevelGroup<'_>,
        keys: Vec<Key>,
    ) -> Result<(IndexedTable, BatchStats), Error> {
        let target = &group.relation.to_entity;
        let identity = self.schema.primary_key(target)?;

        let mut stats = BatchStats {
            prefix: group.prefix.clone(),
            level: group.level,
            entity: target.clone(),
            keys: keys.len(),
            rows: 0,
            fetched: false,
        };

        if keys.is_empty() {
            trace!(prefix = %group.prefix, "no keys, fetch skipped");
            return Ok((IndexedTable::new(), stats));
        }

        let mut fields = vec![identity.to_string()];
        for column in group.columns() {
            if !fields.contains(&column) {
                fields.push(column);
            }
        }

        let values = keys.iter().map(Key::to_value).collect();
        let request = FetchRequest::new(target.clone(), fields)
            .with_filter(FilterExpr::in_values(identity, values));
        let rows = self.store.fetch_rows(&request)?;

        stats.rows = rows.len();
        stats.fetched = true;

        let mut table = IndexedTable::with_capacity(rows.len());
        for row in rows {
            let key = row
                .get(identity)
                .and_then(Value::to_key)
                .ok_or_else(|| Error::InvalidKey {
                    entity: target.clone(),
                    field: identity.to_string(),
                })?;
            table.insert(key, row);
        }

        debug!(
            prefix = %group.prefix,
            level = group.level,
            entity = %target,
            keys = stats.keys,
            rows = stats.rows,
            "batched fetch"
        );
        Ok((table, stats))
    }
}
