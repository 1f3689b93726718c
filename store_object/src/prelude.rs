//! Convenience re-exports for common store-object usage

// Core traits
pub use crate::traits::{LookupRegistry, RecordProvider, Referenceable};

// Error types
pub use crate::errors::StorehausError;

// HStore fields and values
pub use crate::hstore::{
    deserialize_references, serialize_references, HStoreDictionary, HStoreField, LazyReference,
    ReferenceFormat,
};

// Manager and record loading
pub use crate::manager::{HStoreManager, PgRecordProvider};

// ID type
pub use crate::id_type::{HasUniversalId, UniversalId};

// Validation
pub use crate::validation::{ValidatedFieldName, ValidatedTableName, ValidationError};

// Lookups and query building
pub use crate::query_builder::{
    CastMode, FieldKind, FieldLookup, FieldLookupRegistry, HStoreLookupResolver, QueryBuilder,
    QueryFilter,
};

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use sqlx::{FromRow, PgPool};
pub use type_mapping::PostgresValue;
pub use uuid::Uuid;
