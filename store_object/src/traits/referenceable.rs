//! Traits for records stored as references inside hstore values

use crate::errors::StorehausError;
use crate::id_type::HasUniversalId;
use async_trait::async_trait;

/// A record that can be referenced from an hstore column as `<table>:<pk>`
pub trait Referenceable: Send + Sync {
    /// The type used for the primary key
    type Id: HasUniversalId;

    /// The table name in the database
    fn table_name() -> &'static str;

    /// The primary key column name
    fn primary_key_field() -> &'static str {
        "id"
    }

    /// Primary key of this record
    fn extract_id(&self) -> Self::Id;
}

/// Loads referenced records on demand
///
/// Returns `Ok(None)` when no record matches; lazy references treat both
/// that and an error as an unresolved reference.
#[async_trait]
pub trait RecordProvider<E>: Send + Sync {
    async fn fetch_by_identifier(
        &self,
        table_name: &str,
        primary_key: &str,
    ) -> Result<Option<E>, StorehausError>;
}
