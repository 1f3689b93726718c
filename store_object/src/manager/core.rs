use crate::errors::StorehausError;
use crate::id_type::UniversalId;
use crate::manager::statements::HStoreStatements;
use crate::query_builder::{QueryFilter, SqlFragment, PLACEHOLDER};
use crate::validation::{ValidatedFieldName, ValidatedTableName};
use crate::DbPool;
use type_mapping::PostgresValue;

/// Runs hstore operations against the rows of one table
#[derive(Clone)]
pub struct HStoreManager {
    pub(crate) db_pool: DbPool,
    pub(crate) table: ValidatedTableName,
    pub(crate) primary_key: ValidatedFieldName,
}

impl std::fmt::Debug for HStoreManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HStoreManager")
            .field("table", &self.table.as_str())
            .field("primary_key", &self.primary_key.as_str())
            .finish()
    }
}

impl HStoreManager {
    /// Manager for `table` keyed by an `id` column
    pub fn new(db_pool: DbPool, table: &str) -> Result<Self, StorehausError> {
        Ok(Self {
            db_pool,
            table: ValidatedTableName::new(table)?,
            primary_key: ValidatedFieldName::new("id")?,
        })
    }

    pub fn with_primary_key(mut self, primary_key: &str) -> Result<Self, StorehausError> {
        self.primary_key = ValidatedFieldName::new(primary_key)?;
        Ok(self)
    }

    pub fn table_name(&self) -> &str {
        self.table.as_str()
    }

    pub fn primary_key(&self) -> &str {
        self.primary_key.as_str()
    }

    pub fn pool(&self) -> &DbPool {
        &self.db_pool
    }

    pub fn statements(&self) -> HStoreStatements<'_> {
        HStoreStatements::new(&self.table, &self.primary_key)
    }

    /// Filter selecting the row with primary key `owner`
    ///
    /// Compares as text so any key type matches its display form.
    pub fn owner_filter(&self, owner: &UniversalId) -> QueryFilter {
        QueryFilter::Lookup(SqlFragment::new(
            format!("{}::text = {}", self.primary_key, PLACEHOLDER),
            vec![PostgresValue::Text(owner.to_string())],
        ))
    }

    pub(crate) fn attr(&self, attr: &str) -> Result<ValidatedFieldName, StorehausError> {
        Ok(ValidatedFieldName::new(attr)?)
    }
}
