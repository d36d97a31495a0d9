//! Request and response shapes exchanged with a store client.
//!
//! Field names serialize in camelCase (`tableName`, `hashKeyElement`, ...);
//! other tooling reads these payloads, so the names are fixed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Item, KeyClause, TaggedValue};
use crate::value::AttrValue;

/// One entry of a conditional-expectation clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expectation {
    /// The stored attribute must equal `value`.
    Value { value: TaggedValue },
    /// The stored attribute must (or must not) exist.
    Exists { exists: bool },
}

impl Expectation {
    pub fn value(value: TaggedValue) -> Self {
        Expectation::Value { value }
    }

    pub fn absent() -> Self {
        Expectation::Exists { exists: false }
    }

    /// Check the expectation against the currently stored attribute.
    pub fn is_met(&self, actual: Option<&TaggedValue>) -> bool {
        match self {
            Expectation::Value { value } => actual == Some(value),
            Expectation::Exists { exists } => actual.is_some() == *exists,
        }
    }
}

/// Conditional-expectation clause: attribute name to expectation.
pub type Expected = BTreeMap<String, Expectation>;

/// Upsert of a single item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteRequest {
    pub table_name: String,
    pub item: Item,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Expected>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_old_values: Option<bool>,
}

/// Deletion of a single item by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    pub table_name: String,
    pub key: KeyClause,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Expected>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_old_values: Option<bool>,
}

/// Point lookup by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadRequest {
    pub table_name: String,
    pub key: KeyClause,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consistent_read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes_to_get: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumed_capacity_units: Option<f64>,
    /// Prior attribute values, when `returnOldValues` was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Item>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumed_capacity_units: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Item>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumed_capacity_units: Option<f64>,
}

/// A synthesized write together with the native values it carries.
///
/// `resolved` holds every property value chosen during synthesis (current
/// values, overrides, defaults, generated ids, bumped versions). It is
/// merged back into the record once the store confirms the write.
#[derive(Debug, Clone)]
pub struct PreparedWrite {
    pub request: WriteRequest,
    pub resolved: BTreeMap<String, AttrValue>,
    pub is_new_record: bool,
}

/// Result of a successful create, update or save.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteOutcome {
    pub consumed_capacity_units: Option<f64>,
    pub old_attributes: Option<Item>,
}

/// Result of a successful delete.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteOutcome {
    pub consumed_capacity_units: Option<f64>,
    pub old_attributes: Option<Item>,
}
