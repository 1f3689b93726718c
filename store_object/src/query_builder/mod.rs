//! Query builder utilities
//!
//! Lookup resolution for hstore columns and the WHERE clause composer used
//! by the hstore manager.

pub mod builder;
pub mod field_lookups;
pub mod filter;
pub mod hstore_lookup;
pub mod sql_generation;


/// Separator between the parts of a lookup path
pub const LOOKUP_SEP: &str = "__";

pub use builder::QueryBuilder;
pub use field_lookups::{default_registry, FieldKind, FieldLookup, FieldLookupRegistry};
pub use filter::{escape_like, LogicalOperator, QueryCondition, QueryFilter, QueryOperator};
pub use hstore_lookup::{CastMode, HStoreLookupResolver, LookupRequest, ResolvedLookup};
pub use sql_generation::{SqlFragment, SqlGenerator, PLACEHOLDER};
