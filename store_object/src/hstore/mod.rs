//! HStore fields
//!
//! Column-level lookups, the dictionary value holder and references to
//! other records stored as hstore values.

pub mod dictionary;
pub mod field;
pub mod references;

pub use dictionary::HStoreDictionary;
pub use field::{HStoreField, HStoreFieldKind, HSTORE_DB_TYPE};
pub use references::{
    deserialize_references, serialize_references, LazyReference, ReferenceFormat, ReferenceId,
};
