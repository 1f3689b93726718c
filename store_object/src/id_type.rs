//! Id Type module
//!
//! Primary keys of referenced records and dictionary owners.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use uuid::Uuid;

/// Universal ID type that can handle both numeric IDs and UUIDs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UniversalId {
    /// Numeric ID (i32, i64, etc.)
    Numeric(i64),
    /// UUID ID
    Uuid(Uuid),
    /// String-based ID
    String(String),
}

impl Display for UniversalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniversalId::Numeric(n) => write!(f, "{}", n),
            UniversalId::Uuid(uuid) => write!(f, "{}", uuid),
            UniversalId::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<i32> for UniversalId {
    fn from(id: i32) -> Self {
        UniversalId::Numeric(id as i64)
    }
}

impl From<i64> for UniversalId {
    fn from(id: i64) -> Self {
        UniversalId::Numeric(id)
    }
}

impl From<Uuid> for UniversalId {
    fn from(id: Uuid) -> Self {
        UniversalId::Uuid(id)
    }
}

impl From<String> for UniversalId {
    fn from(id: String) -> Self {
        UniversalId::String(id)
    }
}

impl From<&str> for UniversalId {
    fn from(id: &str) -> Self {
        UniversalId::String(id.to_string())
    }
}

/// Trait for types that can provide a universal ID
pub trait HasUniversalId {
    fn universal_id(&self) -> UniversalId;
}

impl HasUniversalId for i32 {
    fn universal_id(&self) -> UniversalId {
        UniversalId::Numeric(*self as i64)
    }
}

impl HasUniversalId for i64 {
    fn universal_id(&self) -> UniversalId {
        UniversalId::Numeric(*self)
    }
}

impl HasUniversalId for Uuid {
    fn universal_id(&self) -> UniversalId {
        UniversalId::Uuid(*self)
    }
}

impl HasUniversalId for String {
    fn universal_id(&self) -> UniversalId {
        UniversalId::String(self.clone())
    }
}
