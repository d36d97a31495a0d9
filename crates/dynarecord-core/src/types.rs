//! Core types: property type tags, generators, property specs and the
//! tagged wire values exchanged with the store.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use chrono::Utc;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::api::Record;
use crate::error::ConfigError;
use crate::value::AttrValue;

/// Declared storage type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    /// `S`: string.
    #[serde(rename = "S")]
    String,
    /// `SS`: set of strings.
    #[serde(rename = "SS")]
    StringSet,
    /// `OS`: set of JSON-serialized objects, sent as a string set.
    #[serde(rename = "OS")]
    ObjectSet,
    /// `N`: number.
    #[serde(rename = "N")]
    Number,
    /// `NS`: set of numbers.
    #[serde(rename = "NS")]
    NumberSet,
    /// `D`: date, sent as epoch milliseconds.
    #[serde(rename = "D")]
    Date,
    /// `BU`: binary buffer, sent as base64.
    #[serde(rename = "BU")]
    Binary,
    /// `BO`: boolean, sent as the number 1 or 0.
    #[serde(rename = "BO")]
    Boolean,
    /// `O`: arbitrary object, sent as a JSON string.
    #[serde(rename = "O")]
    Object,
}

impl PropertyType {
    /// The short tag used in metadata declarations.
    pub fn tag(self) -> &'static str {
        match self {
            PropertyType::String => "S",
            PropertyType::StringSet => "SS",
            PropertyType::ObjectSet => "OS",
            PropertyType::Number => "N",
            PropertyType::NumberSet => "NS",
            PropertyType::Date => "D",
            PropertyType::Binary => "BU",
            PropertyType::Boolean => "BO",
            PropertyType::Object => "O",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, PropertyType::Number)
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A user-supplied generator. Receives the owning record.
pub type GeneratorFn = dyn Fn(&Record) -> AttrValue + Send + Sync;

/// How a missing value (or a bumped version) is produced.
#[derive(Clone)]
pub enum Generator {
    UuidV1,
    UuidV4,
    Now,
    Function(Arc<GeneratorFn>),
}

impl Generator {
    /// Wrap a closure as a generator.
    pub fn function(f: impl Fn(&Record) -> AttrValue + Send + Sync + 'static) -> Self {
        Generator::Function(Arc::new(f))
    }

    /// Name used in declarations; function generators are identified by
    /// the address of their closure.
    pub fn name(&self) -> String {
        match self {
            Generator::UuidV1 => "uuidv1".to_string(),
            Generator::UuidV4 => "uuidv4".to_string(),
            Generator::Now => "now".to_string(),
            Generator::Function(f) => format!("fn@{:#x}", Arc::as_ptr(f) as *const () as usize),
        }
    }

    /// Produce a fresh value. Function generators are evaluated against
    /// `record`.
    pub fn generate(&self, record: &Record) -> AttrValue {
        match self {
            Generator::UuidV1 => AttrValue::String(Uuid::now_v1(&NODE_ID).to_string()),
            Generator::UuidV4 => AttrValue::String(Uuid::new_v4().to_string()),
            Generator::Now => AttrValue::Date(Utc::now()),
            Generator::Function(f) => f(record),
        }
    }
}

/// Node identifier for version-1 UUIDs, drawn once per process.
static NODE_ID: LazyLock<[u8; 6]> = LazyLock::new(|| {
    let mut node = [0u8; 6];
    node.copy_from_slice(&Uuid::new_v4().as_bytes()[10..16]);
    // Multicast bit marks the node id as random rather than a MAC address.
    node[0] |= 0x01;
    node
});

impl PartialEq for Generator {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Generator::UuidV1, Generator::UuidV1)
            | (Generator::UuidV4, Generator::UuidV4)
            | (Generator::Now, Generator::Now) => true,
            (Generator::Function(a), Generator::Function(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Generator {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uuidv1" => Ok(Generator::UuidV1),
            "uuidv4" => Ok(Generator::UuidV4),
            "now" => Ok(Generator::Now),
            _ => Err(ConfigError::UnknownGenerator(s.to_string())),
        }
    }
}

impl Serialize for Generator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

/// Per-property mapping rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertySpec {
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<Generator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<AttrValue>,
}

impl PropertySpec {
    pub fn new(property_type: PropertyType) -> Self {
        Self {
            property_type,
            generator: None,
            default: None,
        }
    }

    pub fn with_generator(mut self, generator: Generator) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_default(mut self, value: impl Into<AttrValue>) -> Self {
        self.default = Some(value.into()).filter(|v: &AttrValue| !v.is_null());
        self
    }
}

/// A tagged wire value: a single-key mapping from a type tag to its payload.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaggedValue {
    S(String),
    SS(Vec<String>),
    N(String),
    NS(Vec<String>),
    B(String),
    BS(Vec<String>),
}

impl TaggedValue {
    /// The wire tag of this value.
    pub fn tag(&self) -> &'static str {
        match self {
            TaggedValue::S(_) => "S",
            TaggedValue::SS(_) => "SS",
            TaggedValue::N(_) => "N",
            TaggedValue::NS(_) => "NS",
            TaggedValue::B(_) => "B",
            TaggedValue::BS(_) => "BS",
        }
    }

    /// Approximate stored size of the payload in bytes.
    pub fn byte_size(&self) -> usize {
        match self {
            TaggedValue::S(s) | TaggedValue::N(s) | TaggedValue::B(s) => s.len(),
            TaggedValue::SS(v) | TaggedValue::NS(v) | TaggedValue::BS(v) => {
                v.iter().map(String::len).sum()
            }
        }
    }
}

/// A stored item: attribute name to tagged value.
pub type Item = BTreeMap<String, TaggedValue>;

/// Key clause of a delete or read request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyClause {
    pub hash_key_element: TaggedValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_key_element: Option<TaggedValue>,
}
