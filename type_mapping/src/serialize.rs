//! Serialization utilities
//!
//! This module provides functions for converting Rust values into the
//! flat string-to-string form stored in an hstore column.

use crate::types::PostgresValue;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Date format used for dates stored inside hstore values
pub const HSTORE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Error raised when a value cannot be stored as hstore text
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HStoreConversionError {
    #[error("value for key '{key}' is a {shape} and cannot be stored as hstore text")]
    KeyedValue { key: String, shape: &'static str },

    #[error("a {0} cannot be stored as hstore text")]
    Value(&'static str),

    #[error("hstore payload must serialize to an object, got {0}")]
    NotAnObject(&'static str),

    #[error("failed to serialize hstore payload: {0}")]
    Serialization(String),
}

/// Convert a scalar value to the text stored in hstore
///
/// Returns `None` for nulls, sequences and mappings.
pub fn to_hstore_text(value: &PostgresValue) -> Option<String> {
    match value {
        PostgresValue::Text(s) => Some(s.clone()),
        PostgresValue::Integer(i) => Some(i.to_string()),
        PostgresValue::BigInt(i) => Some(i.to_string()),
        PostgresValue::SmallInt(i) => Some(i.to_string()),
        PostgresValue::Float(f) => Some(f.to_string()),
        PostgresValue::Boolean(b) => Some(b.to_string()),
        PostgresValue::Uuid(u) => Some(u.to_string()),
        PostgresValue::Date(d) => Some(d.format(HSTORE_DATE_FORMAT).to_string()),
        PostgresValue::Timestamp(ts) => Some(ts.to_rfc3339()),
        PostgresValue::Decimal(s) => Some(s.clone()),
        PostgresValue::Array(_)
        | PostgresValue::Record(_)
        | PostgresValue::HStore(_)
        | PostgresValue::TextArray(_)
        | PostgresValue::Null => None,
    }
}

/// Flatten a record into an hstore map, formatting dates as `YYYY-MM-DD`
pub fn record_to_hstore(
    record: &HashMap<String, PostgresValue>,
) -> Result<BTreeMap<String, String>, HStoreConversionError> {
    record
        .iter()
        .map(|(key, value)| {
            to_hstore_text(value)
                .map(|text| (key.clone(), text))
                .ok_or_else(|| HStoreConversionError::KeyedValue {
                    key: key.clone(),
                    shape: value.shape(),
                })
        })
        .collect()
}

/// Prepare any mapping value (record or hstore) as an hstore map
pub fn mapping_to_hstore(
    value: &PostgresValue,
) -> Result<BTreeMap<String, String>, HStoreConversionError> {
    match value {
        PostgresValue::HStore(map) => Ok(map.clone()),
        PostgresValue::Record(record) => record_to_hstore(record),
        other => Err(HStoreConversionError::Value(other.shape())),
    }
}

/// Prepare a sequence value as a list of hstore texts
pub fn sequence_to_text_array(
    value: &PostgresValue,
) -> Result<Vec<String>, HStoreConversionError> {
    match value {
        PostgresValue::TextArray(items) => Ok(items.clone()),
        PostgresValue::Array(items) => items
            .iter()
            .map(|item| {
                to_hstore_text(item).ok_or(HStoreConversionError::Value(item.shape()))
            })
            .collect(),
        other => Err(HStoreConversionError::Value(other.shape())),
    }
}

/// Convert serializable data to an hstore payload
///
/// Strings are kept as-is, numbers and booleans use their text form,
/// nulls are skipped and nested structures are stored as JSON text.
/// `data` must serialize to an object, as structs and maps do.
pub fn serialize_to_hstore_payload<T: Serialize>(
    data: &T,
) -> Result<BTreeMap<String, String>, HStoreConversionError> {
    let map = match serde_json::to_value(data)
        .map_err(|e| HStoreConversionError::Serialization(e.to_string()))?
    {
        serde_json::Value::Object(map) => map,
        other => return Err(HStoreConversionError::NotAnObject(json_shape(&other))),
    };

    let mut payload = BTreeMap::new();
    for (key, value) in map {
        let text = match value {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Null => continue,
            other => other.to_string(),
        };
        payload.insert(key, text);
    }

    Ok(payload)
}

fn json_shape(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "sequence",
        serde_json::Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_dates_are_formatted_as_iso_days() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            to_hstore_text(&PostgresValue::Date(date)),
            Some("2024-03-09".to_string())
        );
    }

    #[test]
    fn test_record_to_hstore_rejects_nested_values() {
        let mut record = HashMap::new();
        record.insert("v".to_string(), PostgresValue::from("1"));
        record.insert("nested".to_string(), PostgresValue::from(vec!["a"]));

        let err = record_to_hstore(&record).unwrap_err();
        assert_eq!(
            err,
            HStoreConversionError::KeyedValue {
                key: "nested".to_string(),
                shape: "sequence",
            }
        );
        assert_eq!(
            err.to_string(),
            "value for key 'nested' is a sequence and cannot be stored as hstore text"
        );
    }

    #[test]
    fn test_record_to_hstore_flattens_scalars() {
        let mut record = HashMap::new();
        record.insert("count".to_string(), PostgresValue::Integer(3));
        record.insert("flag".to_string(), PostgresValue::Boolean(true));
        record.insert(
            "day".to_string(),
            PostgresValue::Date(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()),
        );

        let map = record_to_hstore(&record).unwrap();
        assert_eq!(map["count"], "3");
        assert_eq!(map["flag"], "true");
        assert_eq!(map["day"], "2023-12-31");
    }

    #[test]
    fn test_serialize_struct_payload() {
        #[derive(Serialize)]
        struct Settings {
            theme: String,
            retries: u32,
            beta: bool,
            note: Option<String>,
        }

        let payload = serialize_to_hstore_payload(&Settings {
            theme: "dark".to_string(),
            retries: 3,
            beta: false,
            note: None,
        })
        .unwrap();

        assert_eq!(payload.len(), 3);
        assert_eq!(payload["theme"], "dark");
        assert_eq!(payload["retries"], "3");
        assert_eq!(payload["beta"], "false");
    }

    #[test]
    fn test_payload_requires_an_object() {
        assert_eq!(
            serialize_to_hstore_payload(&vec!["a", "b"]),
            Err(HStoreConversionError::NotAnObject("sequence"))
        );
        assert_eq!(
            serialize_to_hstore_payload(&"plain"),
            Err(HStoreConversionError::NotAnObject("string"))
        );
    }

    #[test]
    fn test_payload_serialization_failure_is_reported() {
        let mut keyed_by_tuple = HashMap::new();
        keyed_by_tuple.insert((1, 2), "x");
        assert!(matches!(
            serialize_to_hstore_payload(&keyed_by_tuple),
            Err(HStoreConversionError::Serialization(_))
        ));
    }

    #[test]
    fn test_empty_struct_gives_empty_payload() {
        #[derive(Serialize)]
        struct Empty {}

        assert_eq!(serialize_to_hstore_payload(&Empty {}), Ok(BTreeMap::new()));
    }
}
