//! Process-wide interning of entity metadata.
//!
//! Descriptors are keyed by the xxh64 hash of their canonical JSON. The hash
//! only selects a bucket; within a bucket descriptors are compared by full
//! structural equality, so two distinct descriptors that happen to collide
//! still get separate entries. Entries are never evicted.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use tracing::debug;
use xxhash_rust::xxh64::xxh64;

use crate::error::{ConfigError, Error};

use super::EntityMetadata;

static GLOBAL: LazyLock<MetadataRegistry> = LazyLock::new(MetadataRegistry::new);

/// Handle to an interned descriptor: the content hash plus the slot within
/// its collision bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetadataHandle {
    hash: u64,
    slot: u32,
}

impl MetadataHandle {
    pub fn hash(&self) -> u64 {
        self.hash
    }
}

impl fmt::Display for MetadataHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}/{}", self.hash, self.slot)
    }
}

/// Append-only store of shared descriptors.
#[derive(Default)]
pub struct MetadataRegistry {
    buckets: RwLock<HashMap<u64, Vec<Arc<EntityMetadata>>>>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by every record in the process.
    pub fn global() -> &'static MetadataRegistry {
        &GLOBAL
    }

    /// Intern `metadata`, returning its handle and the shared instance.
    ///
    /// Registering a descriptor equal to one already present returns the
    /// existing handle and instance.
    pub fn register(
        &self,
        metadata: EntityMetadata,
    ) -> Result<(MetadataHandle, Arc<EntityMetadata>), ConfigError> {
        let hash = xxh64(&metadata.to_canonical_json()?, 0);

        if let Some(found) = Self::find(&self.buckets.read(), hash, &metadata) {
            return Ok(found);
        }

        // Re-check under the write lock: another thread may have inserted
        // the same descriptor in between.
        let mut buckets = self.buckets.write();
        if let Some(found) = Self::find(&buckets, hash, &metadata) {
            return Ok(found);
        }
        let bucket = buckets.entry(hash).or_default();
        let handle = MetadataHandle {
            hash,
            slot: bucket.len() as u32,
        };
        let shared = Arc::new(metadata);
        bucket.push(Arc::clone(&shared));
        debug!(table = %shared.table_name(), handle = %handle, "registered entity metadata");
        Ok((handle, shared))
    }

    /// Look up a descriptor by handle.
    pub fn resolve(&self, handle: MetadataHandle) -> Result<Arc<EntityMetadata>, Error> {
        self.buckets
            .read()
            .get(&handle.hash)
            .and_then(|bucket| bucket.get(handle.slot as usize))
            .cloned()
            .ok_or(Error::NotFound(handle))
    }

    /// Number of distinct descriptors interned.
    pub fn len(&self) -> usize {
        self.buckets.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find(
        buckets: &HashMap<u64, Vec<Arc<EntityMetadata>>>,
        hash: u64,
        metadata: &EntityMetadata,
    ) -> Option<(MetadataHandle, Arc<EntityMetadata>)> {
        let bucket = buckets.get(&hash)?;
        bucket
            .iter()
            .position(|existing| existing.as_ref() == metadata)
            .map(|slot| {
                (
                    MetadataHandle {
                        hash,
                        slot: slot as u32,
                    },
                    Arc::clone(&bucket[slot]),
                )
            })
    }
}
