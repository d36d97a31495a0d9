//! # DynaRecord
//!
//! An active-record style object mapper for hash/range-keyed document
//! stores.
//!
//! Entities are described once by [`EntityMetadata`](catalog::EntityMetadata)
//! (table, keys, optional version key, typed properties with generators and
//! defaults). Equal descriptors are interned in a process-wide registry so
//! that every record of an entity shares one metadata instance. Records are
//! plain attribute bags; their lifecycle operations synthesize
//! store-ready requests with typed encoding, key and version overrides,
//! generated ids and optimistic-concurrency expectations, then hand them to
//! a [`StoreClient`](store::StoreClient).
//!
//! ## Quick Start
//!
//! ```no_run
//! use dynarecord_core::api::{ReadOptions, Record, RecordKey, WriteOptions};
//! use dynarecord_core::catalog::EntityMetadata;
//! use dynarecord_core::store::MemoryStore;
//! use dynarecord_core::types::{Generator, PropertySpec, PropertyType};
//!
//! # async fn run() -> Result<(), dynarecord_core::error::Error> {
//! let store = MemoryStore::new();
//! store.create_table("users").hash_key("id").execute()?;
//!
//! let meta = EntityMetadata::builder("users")
//!     .hash_key("id")
//!     .version_key("version")
//!     .property("id", PropertySpec::new(PropertyType::String).with_generator(Generator::UuidV4))
//!     .property("version", PropertySpec::new(PropertyType::Number).with_default(1))
//!     .property("name", PropertySpec::new(PropertyType::String))
//!     .build()?;
//!
//! // Create: the id is generated, the version defaults to 1.
//! let mut user = Record::new(meta.clone(), [("name", "Alice")])?;
//! user.create(&store, WriteOptions::new()).await?;
//!
//! // Update: the version is bumped and checked against the stored one.
//! user.set("name", "Alice B.");
//! user.update(&store, WriteOptions::new()).await?;
//!
//! // Load into a fresh record.
//! let key = user.key().expect("persisted record has a key");
//! let mut copy = Record::new(meta, std::iter::empty::<(String, String)>())?;
//! assert!(copy.load(&store, &key, &ReadOptions::new()).await?);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod catalog;
pub mod encoding;
pub mod error;
pub mod store;
pub mod types;
pub mod value;
