//! Entity metadata descriptors and their builder.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::encoding;
use crate::error::{ConfigError, Error};
use crate::types::{Generator, PropertySpec, PropertyType, TaggedValue};
use crate::value::AttrValue;

/// Immutable description of one entity shape: table, keys and properties.
///
/// Built through [`MetadataBuilder`] or parsed from a JSON declaration. Both
/// paths validate the table and hash key and fill in properties for key
/// attributes that were not declared explicitly:
///
/// - hash key: `{type: S, generator: uuidv4}`
/// - range key: `{type: S}`
/// - version key: `{type: N, default: 1}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetadata {
    table_name: String,
    hash_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    range_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version_key: Option<String>,
    properties: BTreeMap<String, PropertySpec>,
}

impl EntityMetadata {
    /// Start building metadata for `table_name`.
    pub fn builder(table_name: &str) -> MetadataBuilder {
        MetadataBuilder::new(table_name)
    }

    /// Parse a JSON declaration.
    ///
    /// ```
    /// use dynarecord_core::catalog::EntityMetadata;
    /// use serde_json::json;
    ///
    /// let meta = EntityMetadata::from_json(&json!({
    ///     "tablename": "users",
    ///     "hashkey": "id",
    ///     "versionkey": "version",
    ///     "properties": { "name": { "type": "S" } }
    /// }))
    /// .unwrap();
    /// assert_eq!(meta.table_name(), "users");
    /// assert!(meta.property("version").is_some());
    /// ```
    pub fn from_json(value: &Value) -> Result<Self, ConfigError> {
        let decl: Declaration = serde_json::from_value(value.clone())
            .map_err(|e| ConfigError::InvalidDescriptor(e.to_string()))?;
        decl.into_builder()?.build()
    }

    /// Parse a JSON declaration from text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ConfigError::InvalidDescriptor(e.to_string()))?;
        Self::from_json(&value)
    }

    /// Canonical serialization, used as the registry's hashing input.
    ///
    /// Properties are ordered by name, so equal descriptors always produce
    /// identical bytes.
    pub fn to_canonical_json(&self) -> Result<Vec<u8>, ConfigError> {
        serde_json::to_vec(self).map_err(|e| ConfigError::InvalidDescriptor(e.to_string()))
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn hash_key(&self) -> &str {
        &self.hash_key
    }

    pub fn range_key(&self) -> Option<&str> {
        self.range_key.as_deref()
    }

    pub fn version_key(&self) -> Option<&str> {
        self.version_key.as_deref()
    }

    pub fn properties(&self) -> &BTreeMap<String, PropertySpec> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.get(name)
    }

    /// Look up a declared property, failing with `InvalidProperty`.
    pub fn require_property(&self, name: &str) -> Result<&PropertySpec, Error> {
        self.properties
            .get(name)
            .ok_or_else(|| Error::InvalidProperty(name.to_string()))
    }

    /// Encode a value for a declared property.
    pub fn encode_attribute(&self, name: &str, value: &AttrValue) -> Result<Option<TaggedValue>, Error> {
        Ok(encoding::encode(self.require_property(name)?, value))
    }

    /// Decode a wire value for a declared property.
    pub fn decode_attribute(&self, name: &str, tagged: &TaggedValue) -> Result<Option<AttrValue>, Error> {
        Ok(encoding::decode(self.require_property(name)?, tagged))
    }
}

/// Builder for [`EntityMetadata`].
#[derive(Debug, Clone, Default)]
pub struct MetadataBuilder {
    table_name: String,
    hash_key: Option<String>,
    range_key: Option<String>,
    version_key: Option<String>,
    properties: BTreeMap<String, PropertySpec>,
}

impl MetadataBuilder {
    pub fn new(table_name: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
            ..Self::default()
        }
    }

    /// Set the hash (partition) key attribute.
    pub fn hash_key(mut self, name: &str) -> Self {
        self.hash_key = Some(name.to_string());
        self
    }

    /// Set the (optional) range key attribute.
    pub fn range_key(mut self, name: &str) -> Self {
        self.range_key = Some(name.to_string());
        self
    }

    /// Set the optimistic-concurrency version attribute.
    pub fn version_key(mut self, name: &str) -> Self {
        self.version_key = Some(name.to_string());
        self
    }

    /// Declare a property. A later declaration of the same name replaces
    /// the earlier one.
    pub fn property(mut self, name: &str, spec: PropertySpec) -> Self {
        self.properties.insert(name.to_string(), spec);
        self
    }

    /// Validate and finish the descriptor.
    pub fn build(self) -> Result<EntityMetadata, ConfigError> {
        if self.table_name.trim().is_empty() {
            return Err(ConfigError::MissingTableName);
        }
        let hash_key = self
            .hash_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingHashKey)?;
        let range_key = self.range_key.filter(|k| !k.is_empty());
        let version_key = self.version_key.filter(|k| !k.is_empty());

        let mut properties = self.properties;
        properties.entry(hash_key.clone()).or_insert_with(|| {
            PropertySpec::new(PropertyType::String).with_generator(Generator::UuidV4)
        });
        if let Some(range_key) = &range_key {
            properties
                .entry(range_key.clone())
                .or_insert_with(|| PropertySpec::new(PropertyType::String));
        }
        if let Some(version_key) = &version_key {
            properties
                .entry(version_key.clone())
                .or_insert_with(|| PropertySpec::new(PropertyType::Number).with_default(1));
        }

        Ok(EntityMetadata {
            table_name: self.table_name,
            hash_key,
            range_key,
            version_key,
            properties,
        })
    }
}

/// JSON declaration of an entity. Accepts camelCase keys and the
/// all-lowercase spellings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Declaration {
    #[serde(default, alias = "tablename")]
    table_name: Option<String>,
    #[serde(default, alias = "hashkey")]
    hash_key: Option<String>,
    #[serde(default, alias = "rangekey")]
    range_key: Option<String>,
    #[serde(default, alias = "versionkey")]
    version_key: Option<String>,
    #[serde(default)]
    properties: BTreeMap<String, PropertyDeclaration>,
}

#[derive(Debug, Deserialize)]
struct PropertyDeclaration {
    #[serde(rename = "type")]
    property_type: PropertyType,
    #[serde(default)]
    generator: Option<String>,
    #[serde(default)]
    default: Option<Value>,
}

impl Declaration {
    fn into_builder(self) -> Result<MetadataBuilder, ConfigError> {
        let mut builder = MetadataBuilder::new(self.table_name.as_deref().unwrap_or_default());
        builder.hash_key = self.hash_key;
        builder.range_key = self.range_key;
        builder.version_key = self.version_key;

        for (name, decl) in self.properties {
            let mut spec = PropertySpec::new(decl.property_type);
            if let Some(generator) = decl.generator {
                spec = spec.with_generator(generator.parse()?);
            }
            if let Some(default) = decl.default {
                spec = spec.with_default(AttrValue::from_json(default));
            }
            builder = builder.property(&name, spec);
        }
        Ok(builder)
    }
}
