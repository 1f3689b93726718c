//! Type mapping definitions
//!
//! This module provides the runtime value type passed between the lookup
//! layer and the database driver.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// PostgreSQL values used as lookup operands and bind parameters
///
/// `Record` is an unprepared mapping as supplied by callers; `HStore` and
/// `TextArray` are the prepared forms that are actually bound to hstore
/// and `text[]` parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PostgresValue {
    Text(String),
    Integer(i32),
    BigInt(i64),
    SmallInt(i16),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    Date(NaiveDate),
    Timestamp(chrono::DateTime<chrono::Utc>),
    Decimal(String), // Store as string to preserve precision
    Array(Vec<PostgresValue>),
    Record(HashMap<String, PostgresValue>),
    HStore(BTreeMap<String, String>),
    TextArray(Vec<String>),
    Null,
}

impl PostgresValue {
    /// Short name of the value shape, used in error messages
    pub fn shape(&self) -> &'static str {
        match self {
            PostgresValue::Text(_) => "text",
            PostgresValue::Integer(_) | PostgresValue::BigInt(_) | PostgresValue::SmallInt(_) => {
                "integer"
            }
            PostgresValue::Float(_) => "float",
            PostgresValue::Boolean(_) => "boolean",
            PostgresValue::Uuid(_) => "uuid",
            PostgresValue::Date(_) => "date",
            PostgresValue::Timestamp(_) => "timestamp",
            PostgresValue::Decimal(_) => "decimal",
            PostgresValue::Array(_) | PostgresValue::TextArray(_) => "sequence",
            PostgresValue::Record(_) | PostgresValue::HStore(_) => "mapping",
            PostgresValue::Null => "null",
        }
    }

    /// Whether the value is a key-value mapping (prepared or not)
    pub fn is_mapping(&self) -> bool {
        matches!(self, PostgresValue::Record(_) | PostgresValue::HStore(_))
    }

    /// Whether the value is a sequence (prepared or not)
    pub fn is_sequence(&self) -> bool {
        matches!(self, PostgresValue::Array(_) | PostgresValue::TextArray(_))
    }

    /// Borrow the inner string of a `Text` value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PostgresValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<String> for PostgresValue {
    fn from(val: String) -> Self {
        PostgresValue::Text(val)
    }
}

impl From<&str> for PostgresValue {
    fn from(val: &str) -> Self {
        PostgresValue::Text(val.to_string())
    }
}

impl From<i32> for PostgresValue {
    fn from(val: i32) -> Self {
        PostgresValue::Integer(val)
    }
}

impl From<i64> for PostgresValue {
    fn from(val: i64) -> Self {
        PostgresValue::BigInt(val)
    }
}

impl From<i16> for PostgresValue {
    fn from(val: i16) -> Self {
        PostgresValue::SmallInt(val)
    }
}

impl From<f64> for PostgresValue {
    fn from(val: f64) -> Self {
        PostgresValue::Float(val)
    }
}

impl From<bool> for PostgresValue {
    fn from(val: bool) -> Self {
        PostgresValue::Boolean(val)
    }
}

impl From<Uuid> for PostgresValue {
    fn from(val: Uuid) -> Self {
        PostgresValue::Uuid(val)
    }
}

impl From<NaiveDate> for PostgresValue {
    fn from(val: NaiveDate) -> Self {
        PostgresValue::Date(val)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for PostgresValue {
    fn from(val: chrono::DateTime<chrono::Utc>) -> Self {
        PostgresValue::Timestamp(val)
    }
}

impl From<BTreeMap<String, String>> for PostgresValue {
    fn from(val: BTreeMap<String, String>) -> Self {
        PostgresValue::HStore(val)
    }
}

impl From<HashMap<String, PostgresValue>> for PostgresValue {
    fn from(val: HashMap<String, PostgresValue>) -> Self {
        PostgresValue::Record(val)
    }
}

impl<T> From<Vec<T>> for PostgresValue
where
    T: Into<PostgresValue>,
{
    fn from(val: Vec<T>) -> Self {
        PostgresValue::Array(val.into_iter().map(Into::into).collect())
    }
}

impl<T> From<Option<T>> for PostgresValue
where
    T: Into<PostgresValue>,
{
    fn from(val: Option<T>) -> Self {
        match val {
            Some(v) => v.into(),
            None => PostgresValue::Null,
        }
    }
}
