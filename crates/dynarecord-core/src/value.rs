//! Native attribute values held by a [`Record`](crate::api::Record).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::encoding::{binary, number};

/// An in-memory attribute value.
///
/// `Null` stands for "no value"; the codec never emits it, so a `Null`
/// attribute is simply left out of a synthesized request.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AttrValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Date(DateTime<Utc>),
    Binary(Vec<u8>),
    List(Vec<AttrValue>),
    Object(Map<String, Value>),
}

impl AttrValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    /// JavaScript-style truthiness, used by the `O` encoding.
    pub fn is_truthy(&self) -> bool {
        match self {
            AttrValue::Null => false,
            AttrValue::Bool(b) => *b,
            AttrValue::Number(n) => *n != 0.0 && !n.is_nan(),
            AttrValue::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric view of the value. Strings holding a number parse; dates
    /// yield epoch milliseconds; booleans yield 1 or 0.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            AttrValue::String(s) => s.trim().parse().ok(),
            AttrValue::Date(d) => Some(d.timestamp_millis() as f64),
            AttrValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            AttrValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// String form of the value, as used by the `S`, `SS` and `N` encodings.
    ///
    /// Lists join their elements with `,`; objects serialize as compact JSON.
    pub fn stringify(&self) -> String {
        match self {
            AttrValue::Null => "null".to_string(),
            AttrValue::Bool(b) => b.to_string(),
            AttrValue::Number(n) => number::format_number(*n),
            AttrValue::String(s) => s.clone(),
            AttrValue::Date(d) => d.to_rfc3339_opts(SecondsFormat::Millis, true),
            AttrValue::Binary(b) => String::from_utf8_lossy(b).into_owned(),
            AttrValue::List(items) => items
                .iter()
                .map(|v| if v.is_null() { String::new() } else { v.stringify() })
                .collect::<Vec<_>>()
                .join(","),
            AttrValue::Object(map) => Value::Object(map.clone()).to_string(),
        }
    }

    /// Convert to JSON. Dates become RFC 3339 strings and binary data
    /// becomes base64.
    pub fn to_json(&self) -> Value {
        match self {
            AttrValue::Null => Value::Null,
            AttrValue::Bool(b) => Value::Bool(*b),
            AttrValue::Number(n) => number_to_json(*n),
            AttrValue::String(s) => Value::String(s.clone()),
            AttrValue::Date(d) => Value::String(d.to_rfc3339_opts(SecondsFormat::Millis, true)),
            AttrValue::Binary(b) => Value::String(binary::encode_base64(b)),
            AttrValue::List(items) => Value::Array(items.iter().map(AttrValue::to_json).collect()),
            AttrValue::Object(map) => Value::Object(map.clone()),
        }
    }

    /// Convert from JSON. Arrays become lists; objects stay objects.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => AttrValue::Null,
            Value::Bool(b) => AttrValue::Bool(b),
            Value::Number(n) => n.as_f64().map_or(AttrValue::Null, AttrValue::Number),
            Value::String(s) => AttrValue::String(s),
            Value::Array(items) => {
                AttrValue::List(items.into_iter().map(AttrValue::from_json).collect())
            }
            Value::Object(map) => AttrValue::Object(map),
        }
    }
}

fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::String(s)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Number(n)
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        AttrValue::Number(n as f64)
    }
}

impl From<i32> for AttrValue {
    fn from(n: i32) -> Self {
        AttrValue::Number(f64::from(n))
    }
}

impl From<u32> for AttrValue {
    fn from(n: u32) -> Self {
        AttrValue::Number(f64::from(n))
    }
}

impl From<DateTime<Utc>> for AttrValue {
    fn from(d: DateTime<Utc>) -> Self {
        AttrValue::Date(d)
    }
}

impl From<Vec<AttrValue>> for AttrValue {
    fn from(items: Vec<AttrValue>) -> Self {
        AttrValue::List(items)
    }
}

impl From<Value> for AttrValue {
    fn from(value: Value) -> Self {
        AttrValue::from_json(value)
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttrValue::Null, Into::into)
    }
}
