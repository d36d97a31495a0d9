//! Per-operation options.

use crate::value::AttrValue;

/// Options for write synthesis (`create`, `update`, `save`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteOptions {
    /// Force new-record (or existing-record) handling instead of inferring
    /// it from the record's state.
    pub is_new_record: Option<bool>,
    /// Hash-key value for a new record; ignored for existing records.
    pub new_hash_key_value: Option<AttrValue>,
    /// Range-key value for a new record; ignored for existing records.
    pub new_range_key_value: Option<AttrValue>,
    /// Version-key value to write verbatim, skipping the version bump.
    pub new_version_key_value: Option<AttrValue>,
    /// Omit the version expectation from the request.
    pub drop_version_consistency: bool,
    /// Ask the store for the item's prior attributes (existing records only).
    pub get_old: bool,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_new_record(mut self, is_new: bool) -> Self {
        self.is_new_record = Some(is_new);
        self
    }

    pub fn new_hash_key_value(mut self, value: impl Into<AttrValue>) -> Self {
        self.new_hash_key_value = Some(value.into());
        self
    }

    pub fn new_range_key_value(mut self, value: impl Into<AttrValue>) -> Self {
        self.new_range_key_value = Some(value.into());
        self
    }

    pub fn new_version_key_value(mut self, value: impl Into<AttrValue>) -> Self {
        self.new_version_key_value = Some(value.into());
        self
    }

    pub fn drop_version_consistency(mut self) -> Self {
        self.drop_version_consistency = true;
        self
    }

    pub fn get_old(mut self) -> Self {
        self.get_old = true;
        self
    }
}

/// Options for delete synthesis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    pub drop_version_consistency: bool,
    pub get_old: bool,
}

impl DeleteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drop_version_consistency(mut self) -> Self {
        self.drop_version_consistency = true;
        self
    }

    pub fn get_old(mut self) -> Self {
        self.get_old = true;
        self
    }
}

/// Options for read synthesis and response application.
///
/// `consistent_read` and `attributes_to_get` are copied into the request
/// only when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    pub consistent_read: Option<bool>,
    pub attributes_to_get: Option<Vec<String>>,
    /// Keep attributes the metadata does not declare, unconverted.
    pub allow_loose: bool,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consistent_read(mut self, consistent: bool) -> Self {
        self.consistent_read = Some(consistent);
        self
    }

    pub fn attributes_to_get<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes_to_get = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn allow_loose(mut self) -> Self {
        self.allow_loose = true;
        self
    }
}
