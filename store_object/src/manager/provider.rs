use crate::errors::StorehausError;
use crate::traits::{RecordProvider, Referenceable};
use crate::validation::{ValidatedFieldName, ValidatedTableName};
use crate::DbPool;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::FromRow;
use std::marker::PhantomData;

/// Loads referenced records of type `E` from PostgreSQL
///
/// The primary key is compared as text, matching how it is stored in
/// reference identifiers.
pub struct PgRecordProvider<E> {
    db_pool: DbPool,
    _phantom: PhantomData<fn() -> E>,
}

impl<E> Clone for PgRecordProvider<E> {
    fn clone(&self) -> Self {
        Self::new(self.db_pool.clone())
    }
}

impl<E> PgRecordProvider<E> {
    pub fn new(db_pool: DbPool) -> Self {
        Self {
            db_pool,
            _phantom: PhantomData,
        }
    }
}

#[async_trait]
impl<E> RecordProvider<E> for PgRecordProvider<E>
where
    E: Referenceable + for<'r> FromRow<'r, PgRow> + Unpin + 'static,
{
    async fn fetch_by_identifier(
        &self,
        table_name: &str,
        primary_key: &str,
    ) -> Result<Option<E>, StorehausError> {
        let table = ValidatedTableName::new(table_name)?;
        let pk_field = ValidatedFieldName::new(E::primary_key_field())?;
        let sql = format!("SELECT * FROM {} WHERE {}::text = $1", table, pk_field);
        crate::trace_log!("Resolving reference {}:{}", table_name, primary_key);

        sqlx::query_as::<_, E>(&sql)
            .bind(primary_key)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|e| StorehausError::database_operation(table_name, "fetch_by_identifier", e))
    }
}
