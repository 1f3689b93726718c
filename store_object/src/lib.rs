//! Store Object - hstore field support for HStoreHaus
//!
//! This crate provides the lookup resolver for hstore columns, the WHERE
//! clause composer, dictionary and reference values, and the table-bound
//! hstore manager.

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod errors;
pub mod hstore;
pub mod id_type;
pub mod manager;
pub mod prelude;
pub mod query_builder;
pub mod traits;
pub mod validation;

pub use errors::StorehausError;
pub use hstore::{
    deserialize_references, serialize_references, HStoreDictionary, HStoreField, HStoreFieldKind,
    LazyReference, ReferenceFormat, ReferenceId,
};
pub use id_type::{HasUniversalId, UniversalId};
pub use manager::{HStoreManager, PgRecordProvider};
pub use query_builder::{
    CastMode, FieldKind, FieldLookup, FieldLookupRegistry, HStoreLookupResolver, LookupRequest,
    QueryBuilder, QueryFilter, QueryOperator, ResolvedLookup, SqlFragment,
};
pub use traits::*;
pub use validation::{ValidatedFieldName, ValidatedTableName, ValidationError};

use sqlx::PgPool;

pub type DbPool = PgPool;
