//! Integration tests: record lifecycle against the in-memory store.

use dynarecord_core::api::{
    DeleteOptions, ReadOptions, Record, RecordKey, RecordState, WriteOptions, WriteRequest,
};
use dynarecord_core::catalog::{EntityMetadata, MetadataRegistry};
use dynarecord_core::error::{Error, PreconditionError};
use dynarecord_core::store::{MemoryStore, StoreClient};
use dynarecord_core::types::{Generator, Item, PropertySpec, PropertyType, TaggedValue};
use dynarecord_core::value::AttrValue;

fn users() -> EntityMetadata {
    EntityMetadata::builder("users")
        .hash_key("id")
        .version_key("version")
        .property("name", PropertySpec::new(PropertyType::String))
        .property("active", PropertySpec::new(PropertyType::Boolean))
        .build()
        .unwrap()
}

fn users_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.create_table("users").hash_key("id").execute().unwrap();
    store
}

fn n(v: &str) -> TaggedValue {
    TaggedValue::N(v.to_string())
}

fn s(v: &str) -> TaggedValue {
    TaggedValue::S(v.to_string())
}

fn stored(store: &MemoryStore, id: &AttrValue) -> Item {
    let id = id.as_str().unwrap().to_string();
    store.get_item("users", TaggedValue::S(id), None).unwrap()
}

#[tokio::test]
async fn test_create_then_update_bumps_version() {
    let registry = MetadataRegistry::new();
    let store = users_store();

    let mut user = Record::in_registry(&registry, users(), [("name", "Alice")]).unwrap();
    assert!(user.is_new());

    user.create(&store, WriteOptions::new()).await.unwrap();
    assert_eq!(user.state(), RecordState::Persisted);
    assert_eq!(user.get("version"), Some(&AttrValue::Number(1.0)));

    // Generated uuidv4 hash key.
    let id = user.get("id").cloned().unwrap();
    assert_eq!(id.as_str().unwrap().len(), 36);
    assert_eq!(stored(&store, &id)["version"], n("1"));

    user.set("name", "Alice B.");
    user.update(&store, WriteOptions::new()).await.unwrap();
    assert_eq!(user.get("version"), Some(&AttrValue::Number(2.0)));

    let item = stored(&store, &id);
    assert_eq!(item["version"], n("2"));
    assert_eq!(item["name"], s("Alice B."));
}

#[tokio::test]
async fn test_stale_update_fails_and_invalidates() {
    let registry = MetadataRegistry::new();
    let store = users_store();

    let mut user = Record::in_registry(&registry, users(), [("name", "Alice")]).unwrap();
    user.create(&store, WriteOptions::new()).await.unwrap();
    let mut stale = user.clone();

    user.update(&store, WriteOptions::new()).await.unwrap();

    let err = stale.update(&store, WriteOptions::new()).await.unwrap_err();
    assert!(err.is_conditional_check_failed());
    assert!(stale.is_invalid());
    // The record kept its pre-write values.
    assert_eq!(stale.get("version"), Some(&AttrValue::Number(1.0)));

    let err = stale.update(&store, WriteOptions::new()).await.unwrap_err();
    assert!(matches!(err, Error::Precondition(PreconditionError::Invalid)));
}

#[tokio::test]
async fn test_dropped_version_consistency_overwrites() {
    let registry = MetadataRegistry::new();
    let store = users_store();

    let mut user = Record::in_registry(&registry, users(), [("name", "Alice")]).unwrap();
    user.create(&store, WriteOptions::new()).await.unwrap();
    let mut stale = user.clone();
    user.update(&store, WriteOptions::new()).await.unwrap();

    stale
        .update(&store, WriteOptions::new().drop_version_consistency())
        .await
        .unwrap();
    let id = stale.get("id").cloned().unwrap();
    assert_eq!(stored(&store, &id)["version"], n("2"));
}

#[tokio::test]
async fn test_create_never_overwrites() {
    let registry = MetadataRegistry::new();
    let store = users_store();

    let mut first = Record::in_registry(&registry, users(), [("name", "first")]).unwrap();
    first
        .create(&store, WriteOptions::new().new_hash_key_value("fixed"))
        .await
        .unwrap();
    assert_eq!(first.get("id"), Some(&AttrValue::from("fixed")));

    let mut second = Record::in_registry(&registry, users(), [("name", "second")]).unwrap();
    let err = second
        .create(&store, WriteOptions::new().new_hash_key_value("fixed"))
        .await
        .unwrap_err();
    assert!(err.is_conditional_check_failed());
    assert!(second.is_invalid());
    assert_eq!(second.get("id"), None);

    assert_eq!(stored(&store, &AttrValue::from("fixed"))["name"], s("first"));
}

#[tokio::test]
async fn test_create_rejects_persisted_record() {
    let registry = MetadataRegistry::new();
    let store = users_store();

    let mut user = Record::in_registry(&registry, users(), [("id", "x")]).unwrap();
    let err = user.create(&store, WriteOptions::new()).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Precondition(PreconditionError::AlreadyPersisted)
    ));

    let mut fresh = Record::in_registry(&registry, users(), [("name", "a")]).unwrap();
    let err = fresh.update(&store, WriteOptions::new()).await.unwrap_err();
    assert!(matches!(err, Error::Precondition(PreconditionError::NotPersisted)));
    assert_eq!(store.item_count("users"), Some(0));
}

#[tokio::test]
async fn test_save_creates_then_updates() {
    let registry = MetadataRegistry::new();
    let store = users_store();

    let mut user = Record::in_registry(&registry, users(), [("name", "a")]).unwrap();
    user.save(&store, WriteOptions::new()).await.unwrap();
    user.save(&store, WriteOptions::new()).await.unwrap();
    assert_eq!(user.get("version"), Some(&AttrValue::Number(2.0)));
    assert_eq!(store.item_count("users"), Some(1));
}

#[tokio::test]
async fn test_delete_clears_record() {
    let registry = MetadataRegistry::new();
    let store = users_store();

    let mut user = Record::in_registry(&registry, users(), [("name", "a")]).unwrap();
    user.create(&store, WriteOptions::new()).await.unwrap();
    let key = user.key().unwrap();

    let outcome = user
        .delete(&store, DeleteOptions::new().get_old())
        .await
        .unwrap();
    assert_eq!(outcome.old_attributes.unwrap()["name"], s("a"));
    assert!(user.is_deleted());
    assert!(user.attributes().is_empty());
    assert_eq!(store.item_count("users"), Some(0));

    let err = user.update(&store, WriteOptions::new()).await.unwrap_err();
    assert!(matches!(err, Error::Precondition(PreconditionError::Deleted)));
    let err = user
        .load(&store, &key, &ReadOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Precondition(PreconditionError::Deleted)));
}

#[tokio::test]
async fn test_stale_delete_leaves_record_intact() {
    let registry = MetadataRegistry::new();
    let store = users_store();

    let mut user = Record::in_registry(&registry, users(), [("name", "a")]).unwrap();
    user.create(&store, WriteOptions::new()).await.unwrap();
    let mut stale = user.clone();
    user.update(&store, WriteOptions::new()).await.unwrap();

    let err = stale.delete(&store, DeleteOptions::new()).await.unwrap_err();
    assert!(err.is_conditional_check_failed());
    assert_eq!(stale.state(), RecordState::Persisted);
    assert_eq!(stale.get("name"), Some(&AttrValue::from("a")));
    assert_eq!(store.item_count("users"), Some(1));
}

#[tokio::test]
async fn test_delete_requires_hash_key() {
    let registry = MetadataRegistry::new();
    let store = users_store();

    let mut user = Record::in_registry(&registry, users(), [("name", "a")]).unwrap();
    let err = user.delete(&store, DeleteOptions::new()).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Precondition(PreconditionError::MissingHashKey(ref key)) if key == "id"
    ));
}

#[tokio::test]
async fn test_get_old_only_for_existing_records() {
    let registry = MetadataRegistry::new();
    let store = users_store();

    let mut user = Record::in_registry(&registry, users(), [("name", "a")]).unwrap();
    let outcome = user
        .create(&store, WriteOptions::new().get_old())
        .await
        .unwrap();
    assert!(outcome.old_attributes.is_none());
    assert_eq!(outcome.consumed_capacity_units, Some(1.0));

    let outcome = user
        .update(&store, WriteOptions::new().get_old())
        .await
        .unwrap();
    assert_eq!(outcome.old_attributes.unwrap()["version"], n("1"));
}

#[tokio::test]
async fn test_load_decodes_declared_attributes() {
    let registry = MetadataRegistry::new();
    let store = users_store();

    let mut user = Record::in_registry(
        &registry,
        users(),
        [("name", AttrValue::from("a")), ("active", AttrValue::from(true))],
    )
    .unwrap();
    user.create(&store, WriteOptions::new()).await.unwrap();
    let key = user.key().unwrap();

    let mut copy =
        Record::in_registry(&registry, users(), std::iter::empty::<(String, AttrValue)>()).unwrap();
    let found = copy
        .load(&store, &key, &ReadOptions::new().consistent_read(true))
        .await
        .unwrap();
    assert!(found);
    assert_eq!(copy.get("active"), Some(&AttrValue::Bool(true)));
    assert_eq!(copy.get("version"), Some(&AttrValue::Number(1.0)));
    assert_eq!(copy.get("id"), user.get("id"));
}

#[tokio::test]
async fn test_load_missing_item_returns_false() {
    let registry = MetadataRegistry::new();
    let store = users_store();

    let mut record = Record::in_registry(&registry, users(), [("name", "keep")]).unwrap();
    let found = record
        .load(&store, &RecordKey::new("nobody"), &ReadOptions::new())
        .await
        .unwrap();
    assert!(!found);
    assert_eq!(record.get("name"), Some(&AttrValue::from("keep")));
}

#[tokio::test]
async fn test_loose_attributes() {
    let registry = MetadataRegistry::new();
    let store = users_store();

    let item: Item = [
        ("id".to_string(), s("u1")),
        ("name".to_string(), s("a")),
        ("legacy".to_string(), n("7")),
    ]
    .into_iter()
    .collect();
    store
        .put(&WriteRequest {
            table_name: "users".to_string(),
            item,
            expected: None,
            return_old_values: None,
        })
        .await
        .unwrap();

    let key = RecordKey::new("u1");
    let mut strict =
        Record::in_registry(&registry, users(), std::iter::empty::<(String, AttrValue)>()).unwrap();
    assert!(strict.load(&store, &key, &ReadOptions::new()).await.unwrap());
    assert_eq!(strict.get("legacy"), None);

    let mut loose =
        Record::in_registry(&registry, users(), std::iter::empty::<(String, AttrValue)>()).unwrap();
    assert!(
        loose
            .load(&store, &key, &ReadOptions::new().allow_loose())
            .await
            .unwrap()
    );
    assert_eq!(loose.get("legacy"), Some(&AttrValue::from("7")));
}

#[tokio::test]
async fn test_attributes_to_get_limits_load() {
    let registry = MetadataRegistry::new();
    let store = users_store();

    let mut user = Record::in_registry(&registry, users(), [("name", "a")]).unwrap();
    user.create(&store, WriteOptions::new()).await.unwrap();

    let mut partial =
        Record::in_registry(&registry, users(), std::iter::empty::<(String, AttrValue)>()).unwrap();
    partial
        .load(
            &store,
            &user.key().unwrap(),
            &ReadOptions::new().attributes_to_get(["name"]),
        )
        .await
        .unwrap();
    assert_eq!(partial.attributes().len(), 1);
    assert_eq!(partial.get("name"), Some(&AttrValue::from("a")));
}

#[tokio::test]
async fn test_range_keyed_entity() {
    let registry = MetadataRegistry::new();
    let store = MemoryStore::new();
    store
        .create_table("events")
        .hash_key("stream")
        .range_key("seq")
        .execute()
        .unwrap();

    let meta = EntityMetadata::builder("events")
        .hash_key("stream")
        .range_key("seq")
        .property("seq", PropertySpec::new(PropertyType::Number))
        .property("at", PropertySpec::new(PropertyType::Date).with_generator(Generator::Now))
        .build()
        .unwrap();

    let mut event = Record::in_registry(&registry, meta.clone(), [("stream", "s1")])
        .unwrap()
        .with_state(RecordState::Transient);
    event
        .create(&store, WriteOptions::new().new_range_key_value(5))
        .await
        .unwrap();
    assert_eq!(event.get("seq"), Some(&AttrValue::Number(5.0)));
    assert!(matches!(event.get("at"), Some(AttrValue::Date(_))));

    let item = store.get_item("events", s("s1"), Some(n("5"))).unwrap();
    assert!(matches!(&item["at"], TaggedValue::N(ms) if ms.len() >= 13));

    let mut copy =
        Record::in_registry(&registry, meta, std::iter::empty::<(String, AttrValue)>()).unwrap();
    let key = RecordKey::new("s1").with_range(5);
    assert!(copy.load(&store, &key, &ReadOptions::new()).await.unwrap());

    // Dates travel as epoch milliseconds.
    let written = event.get("at").and_then(AttrValue::as_date).unwrap();
    let loaded = copy.get("at").and_then(AttrValue::as_date).unwrap();
    assert_eq!(loaded.timestamp_millis(), written.timestamp_millis());
}

#[tokio::test]
async fn test_records_share_metadata() {
    let registry = MetadataRegistry::new();
    let a = Record::in_registry(&registry, users(), [("name", "a")]).unwrap();
    let b = Record::in_registry(&registry, users(), [("name", "b")]).unwrap();
    assert_eq!(a.handle(), b.handle());
    assert_eq!(registry.len(), 1);

    let other = EntityMetadata::builder("accounts").hash_key("id").build().unwrap();
    let c = Record::in_registry(&registry, other, [("name", "c")]).unwrap();
    assert_ne!(a.handle(), c.handle());
    assert_eq!(registry.len(), 2);
}
