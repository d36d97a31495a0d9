//! Value codec: native [`AttrValue`]s to and from [`TaggedValue`]s.
//!
//! Encoding is driven by the property's declared type. A value that fits
//! none of the branches for its type encodes to `None` and the attribute is
//! left out of the request; this is not an error. Decoding also dispatches
//! on the declared type and reads whichever payload the wire tag carries.

pub mod binary;
pub mod number;

use serde_json::Value;

use crate::types::{PropertySpec, PropertyType, TaggedValue};
use crate::value::AttrValue;

/// Encode a value for a property. `Null` encodes to `None`.
pub fn encode(spec: &PropertySpec, value: &AttrValue) -> Option<TaggedValue> {
    if value.is_null() {
        return None;
    }

    match spec.property_type {
        // Objects stringify as JSON.
        PropertyType::String => Some(TaggedValue::S(value.stringify())),
        PropertyType::StringSet => {
            let items = value.as_list()?;
            Some(TaggedValue::SS(items.iter().map(AttrValue::stringify).collect()))
        }
        PropertyType::ObjectSet => {
            let items = value.as_list()?;
            Some(TaggedValue::SS(
                items.iter().map(|v| v.to_json().to_string()).collect(),
            ))
        }
        PropertyType::Number => Some(TaggedValue::N(number_text(value))),
        PropertyType::NumberSet => {
            let items = value.as_list()?;
            Some(TaggedValue::NS(
                items
                    .iter()
                    .filter(|v| !v.is_null())
                    .map(number_text)
                    .collect(),
            ))
        }
        PropertyType::Date => match value {
            AttrValue::Date(d) => Some(TaggedValue::N(number::format_date(d))),
            AttrValue::Number(n) => Some(TaggedValue::N(number::format_number(*n))),
            AttrValue::String(s) => {
                number::parse_date_text(s).map(|d| TaggedValue::N(number::format_date(&d)))
            }
            _ => None,
        },
        PropertyType::Binary => match value {
            AttrValue::Binary(bytes) => Some(TaggedValue::B(binary::encode_base64(bytes))),
            _ => None,
        },
        PropertyType::Boolean => {
            let truth = match value {
                AttrValue::Number(n) => *n == 1.0,
                AttrValue::Bool(b) => *b,
                AttrValue::String(s) => s.eq_ignore_ascii_case("true"),
                _ => false,
            };
            Some(TaggedValue::N(if truth { "1" } else { "0" }.to_string()))
        }
        PropertyType::Object => Some(TaggedValue::S(if value.is_truthy() {
            value.to_json().to_string()
        } else {
            "{}".to_string()
        })),
    }
}

/// Number text for `N` and `NS`: dates as epoch millis, booleans as 1/0,
/// everything else stringified.
fn number_text(value: &AttrValue) -> String {
    match value {
        AttrValue::Date(d) => number::format_date(d),
        AttrValue::Bool(b) => u8::from(*b).to_string(),
        other => other.stringify(),
    }
}

/// Decode a wire value for a property. Returns `None` when the payload
/// cannot be read as the declared type.
pub fn decode(spec: &PropertySpec, tagged: &TaggedValue) -> Option<AttrValue> {
    match spec.property_type {
        PropertyType::String => scalar(tagged).map(|s| AttrValue::String(s.to_string())),
        PropertyType::StringSet => set(tagged).map(|items| {
            AttrValue::List(items.iter().map(|s| AttrValue::String(s.clone())).collect())
        }),
        PropertyType::ObjectSet => set(tagged).map(|items| {
            AttrValue::List(items.iter().map(|s| parse_json_or_string(s)).collect())
        }),
        PropertyType::Number => scalar(tagged)
            .and_then(number::parse_number)
            .map(AttrValue::Number),
        PropertyType::NumberSet => set(tagged).map(|items| {
            AttrValue::List(
                items
                    .iter()
                    .filter_map(|s| number::parse_number(s))
                    .map(AttrValue::Number)
                    .collect(),
            )
        }),
        PropertyType::Date => scalar(tagged)
            .and_then(number::parse_date_millis)
            .map(AttrValue::Date),
        PropertyType::Binary => match tagged {
            TaggedValue::B(s) | TaggedValue::S(s) => {
                binary::decode_base64(s).map(AttrValue::Binary)
            }
            TaggedValue::BS(items) => items
                .iter()
                .map(|s| binary::decode_base64(s).map(AttrValue::Binary))
                .collect::<Option<Vec<_>>>()
                .map(AttrValue::List),
            _ => None,
        },
        PropertyType::Boolean => scalar(tagged).map(|s| {
            let s = s.trim();
            AttrValue::Bool(s == "1" || s.eq_ignore_ascii_case("true"))
        }),
        PropertyType::Object => scalar(tagged).map(parse_json_or_string),
    }
}

/// The payload of a wire value, unconverted: scalars become strings and
/// sets become lists of strings.
pub fn raw_value(tagged: &TaggedValue) -> AttrValue {
    match tagged {
        TaggedValue::S(s) | TaggedValue::N(s) | TaggedValue::B(s) => AttrValue::String(s.clone()),
        TaggedValue::SS(items) | TaggedValue::NS(items) | TaggedValue::BS(items) => {
            AttrValue::List(items.iter().map(|s| AttrValue::String(s.clone())).collect())
        }
    }
}

fn scalar(tagged: &TaggedValue) -> Option<&str> {
    match tagged {
        TaggedValue::S(s) | TaggedValue::N(s) | TaggedValue::B(s) => Some(s),
        _ => None,
    }
}

fn set(tagged: &TaggedValue) -> Option<&[String]> {
    match tagged {
        TaggedValue::SS(items) | TaggedValue::NS(items) | TaggedValue::BS(items) => Some(items),
        _ => None,
    }
}

fn parse_json_or_string(text: &str) -> AttrValue {
    serde_json::from_str::<Value>(text)
        .map(AttrValue::from_json)
        .unwrap_or_else(|_| AttrValue::String(text.to_string()))
}
