//! Mapped records and their lifecycle.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::{EntityMetadata, MetadataHandle, MetadataRegistry};
use crate::error::{Error, PreconditionError};
use crate::store::StoreClient;
use crate::value::AttrValue;

use super::builders;
use super::options::{DeleteOptions, ReadOptions, WriteOptions};
use super::request::{DeleteOutcome, WriteOutcome};

/// Lifecycle state of a [`Record`].
///
/// ```text
/// Transient --create--> Persisted --update--> Persisted
/// Persisted --delete--> Deleted
/// Transient | Persisted --failed create/update--> Invalid
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordState {
    /// Constructed, never persisted.
    Transient,
    /// Written by a successful create or update.
    Persisted,
    /// Removed from the store; no further writes.
    Deleted,
    /// A write failed; no further writes on this instance.
    Invalid,
}

/// Key values used to load a record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordKey {
    pub hash: AttrValue,
    pub range: Option<AttrValue>,
}

impl RecordKey {
    pub fn new(hash: impl Into<AttrValue>) -> Self {
        Self {
            hash: hash.into(),
            range: None,
        }
    }

    pub fn with_range(mut self, range: impl Into<AttrValue>) -> Self {
        self.range = Some(range.into());
        self
    }
}

/// A bag of named attribute values mapped onto one entity's metadata.
///
/// The record owns its attributes; the metadata is the shared instance
/// interned in a [`MetadataRegistry`].
///
/// Until an operation (or [`Record::with_state`]) fixes the state
/// explicitly, a live record counts as `Persisted` when its hash key holds
/// a value and `Transient` otherwise.
#[derive(Debug, Clone)]
pub struct Record {
    handle: MetadataHandle,
    metadata: Arc<EntityMetadata>,
    attributes: BTreeMap<String, AttrValue>,
    lifecycle: Option<RecordState>,
}

impl Record {
    /// Build a record, interning `metadata` in the global registry.
    ///
    /// ```
    /// use dynarecord_core::api::{Record, RecordState};
    /// use dynarecord_core::catalog::EntityMetadata;
    ///
    /// let meta = EntityMetadata::builder("users").hash_key("id").build().unwrap();
    /// let record = Record::new(meta, [("name", "Alice")]).unwrap();
    /// assert_eq!(record.state(), RecordState::Transient);
    /// ```
    pub fn new<I, K, V>(metadata: EntityMetadata, attributes: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<AttrValue>,
    {
        Self::in_registry(MetadataRegistry::global(), metadata, attributes)
    }

    /// Build a record, interning `metadata` in `registry`.
    pub fn in_registry<I, K, V>(
        registry: &MetadataRegistry,
        metadata: EntityMetadata,
        attributes: I,
    ) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<AttrValue>,
    {
        let (handle, metadata) = registry.register(metadata)?;
        Ok(Self::from_shared(handle, metadata, attributes))
    }

    /// Build a record for metadata already registered under `handle`.
    pub fn from_handle<I, K, V>(
        registry: &MetadataRegistry,
        handle: MetadataHandle,
        attributes: I,
    ) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<AttrValue>,
    {
        let metadata = registry.resolve(handle)?;
        Ok(Self::from_shared(handle, metadata, attributes))
    }

    fn from_shared<I, K, V>(handle: MetadataHandle, metadata: Arc<EntityMetadata>, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<AttrValue>,
    {
        let mut record = Self {
            handle,
            metadata,
            attributes: BTreeMap::new(),
            lifecycle: None,
        };
        for (name, value) in attributes {
            record.set(name, value);
        }
        record
    }

    /// Fix the lifecycle state instead of inferring it from the hash key.
    pub fn with_state(mut self, state: RecordState) -> Self {
        self.lifecycle = Some(state);
        self
    }

    pub fn handle(&self) -> MetadataHandle {
        self.handle
    }

    pub fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    /// The shared metadata instance.
    pub fn shared_metadata(&self) -> Arc<EntityMetadata> {
        Arc::clone(&self.metadata)
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Set an attribute. Setting `Null` removes it.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        let name = name.into();
        match value.into() {
            AttrValue::Null => {
                self.attributes.remove(&name);
            }
            value => {
                self.attributes.insert(name, value);
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.attributes.remove(name)
    }

    pub fn attributes(&self) -> &BTreeMap<String, AttrValue> {
        &self.attributes
    }

    /// Current key values, if the hash key holds one.
    pub fn key(&self) -> Option<RecordKey> {
        let hash = self.attributes.get(self.metadata.hash_key())?.clone();
        let range = self
            .metadata
            .range_key()
            .and_then(|name| self.attributes.get(name))
            .cloned();
        Some(RecordKey { hash, range })
    }

    pub fn state(&self) -> RecordState {
        match self.lifecycle {
            Some(state) => state,
            None if self.attributes.contains_key(self.metadata.hash_key()) => RecordState::Persisted,
            None => RecordState::Transient,
        }
    }

    pub fn is_new(&self) -> bool {
        self.state() == RecordState::Transient
    }

    pub fn is_deleted(&self) -> bool {
        self.state() == RecordState::Deleted
    }

    pub fn is_invalid(&self) -> bool {
        self.state() == RecordState::Invalid
    }

    // -----------------------------------------------------------------------
    // Lifecycle operations
    // -----------------------------------------------------------------------

    /// Persist a transient record. The request expects the hash key to be
    /// absent in the store, so an existing item is never overwritten.
    pub async fn create<C: StoreClient>(&mut self, client: &C, options: WriteOptions) -> Result<WriteOutcome, Error> {
        self.ensure_writable()?;
        if !self.is_new() {
            return Err(PreconditionError::AlreadyPersisted.into());
        }
        self.write(client, options.is_new_record(true)).await
    }

    /// Write a persisted record, bumping its version.
    pub async fn update<C: StoreClient>(&mut self, client: &C, options: WriteOptions) -> Result<WriteOutcome, Error> {
        self.ensure_writable()?;
        if self.is_new() {
            return Err(PreconditionError::NotPersisted.into());
        }
        self.write(client, options.is_new_record(false)).await
    }

    /// Create or update, depending on the record's state (or on
    /// `options.is_new_record` when set).
    pub async fn save<C: StoreClient>(&mut self, client: &C, options: WriteOptions) -> Result<WriteOutcome, Error> {
        self.ensure_writable()?;
        self.write(client, options).await
    }

    async fn write<C: StoreClient>(&mut self, client: &C, options: WriteOptions) -> Result<WriteOutcome, Error> {
        let prepared = builders::build_write_request(self, &options);

        match client.put(&prepared.request).await {
            Ok(response) => {
                // Merge only after the store confirmed the write.
                self.attributes.extend(prepared.resolved);
                self.lifecycle = Some(RecordState::Persisted);
                debug!(
                    table = %self.metadata.table_name(),
                    is_new = prepared.is_new_record,
                    "record written"
                );
                Ok(WriteOutcome {
                    consumed_capacity_units: response.consumed_capacity_units,
                    old_attributes: response.attributes,
                })
            }
            Err(err) => {
                warn!(
                    table = %self.metadata.table_name(),
                    error = %err,
                    "write failed, record invalidated"
                );
                self.lifecycle = Some(RecordState::Invalid);
                Err(err.into())
            }
        }
    }

    /// Delete the record from the store and clear its attributes.
    ///
    /// A failed delete leaves the record unchanged.
    pub async fn delete<C: StoreClient>(&mut self, client: &C, options: DeleteOptions) -> Result<DeleteOutcome, Error> {
        self.ensure_writable()?;
        let request = builders::build_delete_request(self, &options)?;
        let response = client.delete(&request).await?;

        self.attributes.clear();
        self.lifecycle = Some(RecordState::Deleted);
        debug!(table = %self.metadata.table_name(), "record deleted");

        Ok(DeleteOutcome {
            consumed_capacity_units: response.consumed_capacity_units,
            old_attributes: if options.get_old { response.attributes } else { None },
        })
    }

    /// Load the item stored under `key` into this record.
    ///
    /// Returns `false` (and leaves the record untouched) when the store holds
    /// no such item.
    pub async fn load<C: StoreClient>(&mut self, client: &C, key: &RecordKey, options: &ReadOptions) -> Result<bool, Error> {
        if self.is_deleted() {
            return Err(PreconditionError::Deleted.into());
        }
        let request = builders::build_read_request(&self.metadata, key, options)?;
        let response = client.get(&request).await?;

        match response.item {
            Some(item) => {
                builders::apply_read_response(self, &item, options)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn ensure_writable(&self) -> Result<(), PreconditionError> {
        match self.state() {
            RecordState::Deleted => Err(PreconditionError::Deleted),
            RecordState::Invalid => Err(PreconditionError::Invalid),
            RecordState::Transient | RecordState::Persisted => Ok(()),
        }
    }
}
