//! Traits for hstore fields
//!
//! Seams between the lookup resolver, the reference layer and whatever
//! supplies lookups and records to them.

pub mod lookup_registry;
pub mod referenceable;

pub use lookup_registry::LookupRegistry;
pub use referenceable::{RecordProvider, Referenceable};
