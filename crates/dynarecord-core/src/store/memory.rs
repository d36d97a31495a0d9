//! In-process store client.
//!
//! Tables live in a `RwLock`-guarded map. Every request is validated against
//! the table's key schema, conditional clauses are evaluated against the
//! stored item before any mutation, and consumed capacity is reported the
//! way a provisioned store would: one write unit per started KiB of item,
//! one read unit per started 4 KiB (half that for eventually consistent
//! reads).

use std::collections::{BTreeMap, HashMap};
use std::future::{self, Future};

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::api::{
    DeleteRequest, DeleteResponse, Expected, GetResponse, PutResponse, ReadRequest, WriteRequest,
};
use crate::error::StoreError;
use crate::types::{Item, KeyClause, TaggedValue};

use super::StoreClient;

const WRITE_UNIT_BYTES: usize = 1024;
const READ_UNIT_BYTES: usize = 4096;

type StoredKey = (TaggedValue, Option<TaggedValue>);

struct MemoryTable {
    hash_key: String,
    range_key: Option<String>,
    items: BTreeMap<StoredKey, Item>,
}

impl MemoryTable {
    fn key_of_item(&self, table: &str, item: &Item) -> Result<StoredKey, StoreError> {
        let hash = item.get(&self.hash_key).cloned().ok_or_else(|| {
            StoreError::Validation(format!(
                "item for table '{table}' is missing hash key '{}'",
                self.hash_key
            ))
        })?;
        let range = match &self.range_key {
            Some(name) => Some(item.get(name).cloned().ok_or_else(|| {
                StoreError::Validation(format!(
                    "item for table '{table}' is missing range key '{name}'"
                ))
            })?),
            None => None,
        };
        Ok((hash, range))
    }

    fn key_of_clause(&self, table: &str, key: &KeyClause) -> Result<StoredKey, StoreError> {
        match (&self.range_key, &key.range_key_element) {
            (Some(name), None) => Err(StoreError::Validation(format!(
                "key for table '{table}' is missing range key '{name}'"
            ))),
            (None, Some(_)) => Err(StoreError::Validation(format!(
                "table '{table}' has no range key"
            ))),
            _ => Ok((key.hash_key_element.clone(), key.range_key_element.clone())),
        }
    }
}

/// A store client holding every table in memory.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, MemoryTable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a new table.
    pub fn create_table(&self, name: &str) -> MemoryTableBuilder<'_> {
        MemoryTableBuilder {
            store: self,
            name: name.to_string(),
            hash_key: None,
            range_key: None,
        }
    }

    /// Number of items stored in `table`, or `None` if it does not exist.
    pub fn item_count(&self, table: &str) -> Option<usize> {
        self.tables.read().get(table).map(|t| t.items.len())
    }

    /// Direct lookup, bypassing request synthesis.
    pub fn get_item(&self, table: &str, hash: TaggedValue, range: Option<TaggedValue>) -> Option<Item> {
        self.tables
            .read()
            .get(table)
            .and_then(|t| t.items.get(&(hash, range)).cloned())
    }

    fn put_item(&self, request: &WriteRequest) -> Result<PutResponse, StoreError> {
        let mut tables = self.tables.write();
        let table = tables
            .get_mut(&request.table_name)
            .ok_or_else(|| StoreError::ResourceNotFound(request.table_name.clone()))?;

        let key = table.key_of_item(&request.table_name, &request.item)?;
        check_expected(
            &request.table_name,
            request.expected.as_ref(),
            table.items.get(&key),
        )?;

        let units = write_units(&request.item);
        let old = table.items.insert(key, request.item.clone());
        trace!(table = %request.table_name, replaced = old.is_some(), "put item");

        Ok(PutResponse {
            consumed_capacity_units: Some(units),
            attributes: old.filter(|_| request.return_old_values == Some(true)),
        })
    }

    fn delete_item(&self, request: &DeleteRequest) -> Result<DeleteResponse, StoreError> {
        let mut tables = self.tables.write();
        let table = tables
            .get_mut(&request.table_name)
            .ok_or_else(|| StoreError::ResourceNotFound(request.table_name.clone()))?;

        let key = table.key_of_clause(&request.table_name, &request.key)?;
        check_expected(
            &request.table_name,
            request.expected.as_ref(),
            table.items.get(&key),
        )?;

        let old = table.items.remove(&key);
        let units = old.as_ref().map_or(1.0, write_units);
        trace!(table = %request.table_name, existed = old.is_some(), "deleted item");

        Ok(DeleteResponse {
            consumed_capacity_units: Some(units),
            attributes: old.filter(|_| request.return_old_values == Some(true)),
        })
    }

    fn read_item(&self, request: &ReadRequest) -> Result<GetResponse, StoreError> {
        let tables = self.tables.read();
        let table = tables
            .get(&request.table_name)
            .ok_or_else(|| StoreError::ResourceNotFound(request.table_name.clone()))?;

        let key = table.key_of_clause(&request.table_name, &request.key)?;
        let consistent = request.consistent_read == Some(true);
        let Some(stored) = table.items.get(&key) else {
            return Ok(GetResponse {
                item: None,
                consumed_capacity_units: Some(read_units(0, consistent)),
            });
        };

        let item = match &request.attributes_to_get {
            Some(names) => stored
                .iter()
                .filter(|(name, _)| names.contains(name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            None => stored.clone(),
        };

        Ok(GetResponse {
            consumed_capacity_units: Some(read_units(item_size(&item), consistent)),
            item: Some(item),
        })
    }
}

impl StoreClient for MemoryStore {
    fn put(&self, request: &WriteRequest) -> impl Future<Output = Result<PutResponse, StoreError>> + Send {
        future::ready(self.put_item(request))
    }

    fn delete(
        &self,
        request: &DeleteRequest,
    ) -> impl Future<Output = Result<DeleteResponse, StoreError>> + Send {
        future::ready(self.delete_item(request))
    }

    fn get(&self, request: &ReadRequest) -> impl Future<Output = Result<GetResponse, StoreError>> + Send {
        future::ready(self.read_item(request))
    }
}

/// Builder for [`MemoryStore::create_table`].
pub struct MemoryTableBuilder<'a> {
    store: &'a MemoryStore,
    name: String,
    hash_key: Option<String>,
    range_key: Option<String>,
}

impl MemoryTableBuilder<'_> {
    /// Set the hash key attribute name.
    pub fn hash_key(mut self, name: &str) -> Self {
        self.hash_key = Some(name.to_string());
        self
    }

    /// Set the (optional) range key attribute name.
    pub fn range_key(mut self, name: &str) -> Self {
        self.range_key = Some(name.to_string());
        self
    }

    /// Create the table.
    pub fn execute(self) -> Result<(), StoreError> {
        let hash_key = self
            .hash_key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| StoreError::Validation(format!("table '{}' requires a hash key", self.name)))?;

        let mut tables = self.store.tables.write();
        if tables.contains_key(&self.name) {
            return Err(StoreError::Validation(format!(
                "table '{}' already exists",
                self.name
            )));
        }
        debug!(table = %self.name, hash_key = %hash_key, range_key = ?self.range_key, "created table");
        tables.insert(
            self.name,
            MemoryTable {
                hash_key,
                range_key: self.range_key,
                items: BTreeMap::new(),
            },
        );
        Ok(())
    }
}

/// Evaluate every expectation against the currently stored item.
fn check_expected(table: &str, expected: Option<&Expected>, stored: Option<&Item>) -> Result<(), StoreError> {
    let Some(expected) = expected else {
        return Ok(());
    };
    for (name, expectation) in expected {
        let actual = stored.and_then(|item| item.get(name));
        if !expectation.is_met(actual) {
            debug!(table, attribute = %name, "conditional check failed");
            return Err(StoreError::ConditionalCheckFailed {
                table: table.to_string(),
            });
        }
    }
    Ok(())
}

fn item_size(item: &Item) -> usize {
    item.iter().map(|(name, value)| name.len() + value.byte_size()).sum()
}

fn write_units(item: &Item) -> f64 {
    item_size(item).div_ceil(WRITE_UNIT_BYTES).max(1) as f64
}

fn read_units(size: usize, consistent: bool) -> f64 {
    let units = size.div_ceil(READ_UNIT_BYTES).max(1) as f64;
    if consistent { units } else { units / 2.0 }
}
