//! Request synthesis: records and options in, store requests out.
//!
//! Every function here is pure with respect to the store. The lifecycle
//! methods on [`Record`] call them, hand the result to a store client, and
//! apply the outcome.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::catalog::EntityMetadata;
use crate::encoding;
use crate::error::{Error, PreconditionError};
use crate::types::{Item, KeyClause, PropertySpec, PropertyType};
use crate::value::AttrValue;

use super::options::{DeleteOptions, ReadOptions, WriteOptions};
use super::record::{Record, RecordKey};
use super::request::{DeleteRequest, Expectation, Expected, PreparedWrite, ReadRequest, WriteRequest};

// ---------------------------------------------------------------------------
// Write
// ---------------------------------------------------------------------------

/// Build the put request for `record`.
///
/// Each declared property resolves to a value by the first rule that
/// applies:
///
/// 1. version key with `new_version_key_value` set: that value;
/// 2. version key on an existing record: the bumped version (generator,
///    else `+1` for numbers, else now for dates);
/// 3. hash key on a new record with `new_hash_key_value` set: that value;
/// 4. range key on a new record with `new_range_key_value` set: that value;
/// 5. the record's current value.
///
/// A new record whose value is still absent falls back to the property's
/// generator, then its default. Values that do not encode are left out of
/// the item.
pub fn build_write_request(record: &Record, options: &WriteOptions) -> PreparedWrite {
    let metadata = record.metadata();
    let is_new = options.is_new_record.unwrap_or_else(|| record.is_new());
    let version_key = metadata.version_key();

    let mut resolved = BTreeMap::new();
    for (name, spec) in metadata.properties() {
        let is_version = version_key == Some(name.as_str());
        let current = || record.get(name).cloned().unwrap_or_default();

        let mut value = if is_version && options.new_version_key_value.is_some() {
            options.new_version_key_value.clone().unwrap_or_default()
        } else if is_version && !is_new {
            bump_version(record, name, spec).unwrap_or_else(current)
        } else if is_new && name == metadata.hash_key() && options.new_hash_key_value.is_some() {
            options.new_hash_key_value.clone().unwrap_or_default()
        } else if is_new
            && metadata.range_key() == Some(name.as_str())
            && options.new_range_key_value.is_some()
        {
            options.new_range_key_value.clone().unwrap_or_default()
        } else {
            current()
        };

        if is_new && value.is_null() {
            value = substitute(record, spec);
        }

        trace!(property = %name, value = ?value, "resolved property");
        if !value.is_null() {
            resolved.insert(name.clone(), value);
        }
    }

    let item: Item = resolved
        .iter()
        .filter_map(|(name, value)| {
            let spec = metadata.property(name)?;
            encoding::encode(spec, value).map(|tagged| (name.clone(), tagged))
        })
        .collect();

    let expected = if is_new {
        let mut expected = Expected::new();
        expected.insert(metadata.hash_key().to_string(), Expectation::absent());
        Some(expected)
    } else {
        version_expectation(record, options.drop_version_consistency)
    };

    debug!(
        table = %metadata.table_name(),
        is_new,
        attributes = item.len(),
        "built write request"
    );

    PreparedWrite {
        request: WriteRequest {
            table_name: metadata.table_name().to_string(),
            item,
            expected,
            return_old_values: (options.get_old && !is_new).then_some(true),
        },
        resolved,
        is_new_record: is_new,
    }
}

/// Next version value for an existing record, or `None` when the property
/// has no bump rule.
fn bump_version(record: &Record, name: &str, spec: &PropertySpec) -> Option<AttrValue> {
    if let Some(generator) = &spec.generator {
        return Some(generator.generate(record));
    }
    match spec.property_type {
        PropertyType::Number => {
            let current = record.get(name).and_then(AttrValue::as_f64).unwrap_or(0.0);
            Some(AttrValue::Number(current + 1.0))
        }
        PropertyType::Date => Some(AttrValue::Date(chrono::Utc::now())),
        _ => None,
    }
}

/// Value for an absent property of a new record: generator first, then
/// default.
fn substitute(record: &Record, spec: &PropertySpec) -> AttrValue {
    if let Some(generator) = &spec.generator {
        return generator.generate(record);
    }
    spec.default.clone().unwrap_or_default()
}

/// Expectation on the version currently held by `record`, unless dropped.
///
/// A record holding no version value expects the attribute to be absent.
fn version_expectation(record: &Record, drop_version_consistency: bool) -> Option<Expected> {
    if drop_version_consistency {
        return None;
    }
    let metadata = record.metadata();
    let version_key = metadata.version_key()?;
    let spec = metadata.property(version_key)?;

    let expectation = record
        .get(version_key)
        .and_then(|previous| encoding::encode(spec, previous))
        .map_or_else(Expectation::absent, Expectation::value);

    let mut expected = Expected::new();
    expected.insert(version_key.to_string(), expectation);
    Some(expected)
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// Build the delete request for `record`. The hash key must hold a value.
pub fn build_delete_request(record: &Record, options: &DeleteOptions) -> Result<DeleteRequest, Error> {
    let metadata = record.metadata();
    let hash_key = metadata.hash_key();

    let hash_value = record
        .get(hash_key)
        .ok_or_else(|| PreconditionError::MissingHashKey(hash_key.to_string()))?;
    let hash_key_element = metadata
        .encode_attribute(hash_key, hash_value)?
        .ok_or_else(|| PreconditionError::MissingHashKey(hash_key.to_string()))?;

    let range_key_element = match metadata.range_key() {
        Some(range_key) => match record.get(range_key) {
            Some(value) => metadata.encode_attribute(range_key, value)?,
            None => None,
        },
        None => None,
    };

    debug!(table = %metadata.table_name(), "built delete request");

    Ok(DeleteRequest {
        table_name: metadata.table_name().to_string(),
        key: KeyClause {
            hash_key_element,
            range_key_element,
        },
        expected: version_expectation(record, options.drop_version_consistency),
        return_old_values: options.get_old.then_some(true),
    })
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

/// Build the point-read request for `key`.
pub fn build_read_request(
    metadata: &EntityMetadata,
    key: &RecordKey,
    options: &ReadOptions,
) -> Result<ReadRequest, Error> {
    let hash_key = metadata.hash_key();
    let hash_key_element = metadata
        .encode_attribute(hash_key, &key.hash)?
        .ok_or_else(|| PreconditionError::MissingKeyValue(hash_key.to_string()))?;

    let range_key_element = match (metadata.range_key(), &key.range) {
        (Some(range_key), Some(value)) => metadata.encode_attribute(range_key, value)?,
        _ => None,
    };

    debug!(table = %metadata.table_name(), "built read request");

    Ok(ReadRequest {
        table_name: metadata.table_name().to_string(),
        key: KeyClause {
            hash_key_element,
            range_key_element,
        },
        consistent_read: options.consistent_read,
        attributes_to_get: options.attributes_to_get.clone(),
    })
}

/// Assign the attributes of a read response onto `record`.
///
/// Declared attributes are decoded; a payload that does not decode as the
/// declared type clears the attribute. Undeclared attributes are kept raw
/// when `allow_loose` is set and ignored otherwise.
pub fn apply_read_response(record: &mut Record, item: &Item, options: &ReadOptions) -> Result<(), Error> {
    let metadata = record.shared_metadata();
    for (name, tagged) in item {
        if metadata.property(name).is_some() {
            let value = metadata.decode_attribute(name, tagged)?;
            record.set(name, value.unwrap_or_default());
        } else if options.allow_loose {
            record.set(name, encoding::raw_value(tagged));
        } else {
            trace!(attribute = %name, "ignoring undeclared attribute");
        }
    }
    Ok(())
}
