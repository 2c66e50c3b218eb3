//! Sled-backed row store.

use std::collections::HashSet;

use sled::{Db, Tree};
use tracing::{debug, trace};

use super::codec::{decode_row_projected, encode_row};
use super::{key, Record, StorageConfig};
use crate::catalog::SchemaBundle;
use crate::error::Error;
use crate::store::{finish_rows, FetchRequest, Row, RowStore};
use crate::value::Key;

/// Tree name for row data.
const DATA_TREE: &str = "rows";

/// Persistent row store keyed by entity and primary key.
///
/// Primary-key `IN` fetches, the shape every batched relation fetch takes, are
/// served by point lookups. Any other filter scans the entity's key range.
pub struct SledStore {
    /// The underlying sled database.
    db: Db,

    /// Tree for row data.
    data_tree: Tree,

    /// Schema used to find each entity's primary key.
    schema: SchemaBundle,
}

impl SledStore {
    /// Open or create a store with the given configuration.
    pub fn open(config: StorageConfig, schema: SchemaBundle) -> Result<Self, Error> {
        let db = config.to_sled_config().open()?;
        let data_tree = db.open_tree(DATA_TREE)?;

        Ok(Self {
            db,
            data_tree,
            schema,
        })
    }

    /// Check if the database was recovered from a previous run.
    pub fn was_recovered(&self) -> bool {
        self.db.was_recovered()
    }

    /// The schema this store keys rows by.
    pub fn schema(&self) -> &SchemaBundle {
        &self.schema
    }

    /// Insert or replace a row. The row must carry its primary key.
    pub fn insert(&self, entity: &str, row: &Row) -> Result<Key, Error> {
        let primary_key = self.row_key(entity, row)?;
        let record = Record::new(encode_row(row)?);

        self.data_tree
            .insert(key::encode(entity, &primary_key), record.to_bytes()?)?;
        Ok(primary_key)
    }

    /// Insert many rows in one sled batch.
    pub fn insert_many<'r>(
        &self,
        entity: &str,
        rows: impl IntoIterator<Item = &'r Row>,
    ) -> Result<usize, Error> {
        let mut batch = sled::Batch::default();
        let mut count = 0;

        for row in rows {
            let primary_key = self.row_key(entity, row)?;
            let record = Record::new(encode_row(row)?);
            batch.insert(key::encode(entity, &primary_key), record.to_bytes()?);
            count += 1;
        }

        self.data_tree.apply_batch(batch)?;
        debug!(entity, rows = count, "inserted row batch");
        Ok(count)
    }

    /// Get a full row by primary key.
    pub fn get(&self, entity: &str, primary_key: &Key) -> Result<Option<Row>, Error> {
        match self.data_tree.get(key::encode(entity, primary_key))? {
            Some(bytes) => {
                let record = Record::from_bytes(&bytes)?;
                Ok(Some(super::codec::decode_row(&record.data)?))
            }
            None => Ok(None),
        }
    }

    /// Remove a row. Returns whether it existed.
    pub fn remove(&self, entity: &str, primary_key: &Key) -> Result<bool, Error> {
        Ok(self
            .data_tree
            .remove(key::encode(entity, primary_key))?
            .is_some())
    }

    /// Number of rows stored for an entity.
    pub fn count(&self, entity: &str) -> usize {
        self.data_tree.scan_prefix(key::entity_prefix(entity)).count()
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.data_tree.flush()?;
        Ok(())
    }

    fn row_key(&self, entity: &str, row: &Row) -> Result<Key, Error> {
        let identity = self.schema.primary_key(entity)?;
        row.get(identity)
            .and_then(|v| v.to_key())
            .ok_or_else(|| Error::InvalidKey {
                entity: entity.to_string(),
                field: identity.to_string(),
            })
    }

    /// Fields that must be decoded to serve a request.
    fn decode_set(request: &FetchRequest) -> HashSet<String> {
        let mut fields: HashSet<String> = request.fields.iter().cloned().collect();
        if let Some(filter) = &request.filter {
            fields.extend(filter.fields());
        }
        fields.extend(request.order_by.iter().map(|o| o.field.clone()));
        fields
    }

    fn lookup_keys(&self, request: &FetchRequest, keys: &[Key]) -> Result<Vec<Row>, Error> {
        let wanted = Self::decode_set(request);
        let wanted: HashSet<&str> = wanted.iter().map(String::as_str).collect();
        let mut seen = HashSet::with_capacity(keys.len());
        let mut rows = Vec::with_capacity(keys.len());

        for primary_key in keys {
            if !seen.insert(primary_key) {
                continue;
            }
            if let Some(bytes) = self.data_tree.get(key::encode(&request.entity, primary_key))? {
                let record = Record::from_bytes(&bytes)?;
                rows.push(decode_row_projected(&record.data, &wanted)?);
            }
        }

        trace!(entity = %request.entity, keys = keys.len(), found = rows.len(), "point lookups");
        Ok(rows)
    }

    fn scan(&self, request: &FetchRequest) -> Result<Vec<Row>, Error> {
        let wanted = Self::decode_set(request);
        let wanted: HashSet<&str> = wanted.iter().map(String::as_str).collect();
        let mut rows = Vec::new();

        for result in self.data_tree.scan_prefix(key::entity_prefix(&request.entity)) {
            let (_key, bytes) = result?;
            let record = Record::from_bytes(&bytes)?;
            rows.push(decode_row_projected(&record.data, &wanted)?);
        }

        trace!(entity = %request.entity, rows = rows.len(), "prefix scan");
        Ok(rows)
    }
}

impl RowStore for SledStore {
    fn fetch_rows(&self, request: &FetchRequest) -> Result<Vec<Row>, Error> {
        let identity = self.schema.primary_key(&request.entity)?;

        let point_keys: Option<Vec<Key>> = request
            .filter
            .as_ref()
            .and_then(|f| f.as_in_list(identity))
            .map(|values| values.iter().filter_map(|v| v.to_key()).collect());

        let candidates = match point_keys {
            Some(keys) => self.lookup_keys(request, &keys)?,
            None => self.scan(request)?,
        };

        Ok(finish_rows(candidates, request))
    }
}
