//! Lookup registry trait
//!
//! Keyed hstore lookups delegate their final comparison to whatever lookup
//! the registry holds for the extracted value's kind.

use crate::query_builder::field_lookups::{FieldKind, FieldLookup};

/// Source of comparison lookups per field kind
pub trait LookupRegistry: Send + Sync {
    /// Lookup registered under `name` for `kind`, if any
    fn get_lookup(&self, kind: FieldKind, name: &str) -> Option<FieldLookup>;
}
