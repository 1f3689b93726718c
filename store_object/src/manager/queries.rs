//! Execution of hstore manager operations

use crate::errors::StorehausError;
use crate::hstore::dictionary::HStoreDictionary;
use crate::hstore::references::{deserialize_references, LazyReference, ReferenceFormat};
use crate::id_type::UniversalId;
use crate::manager::core::HStoreManager;
use crate::query_builder::QueryBuilder;
use crate::traits::Referenceable;
use sqlx::postgres::types::PgHstore;
use sqlx::postgres::PgRow;
use sqlx::FromRow;
use std::collections::BTreeMap;
use type_mapping::{record_to_hstore, sequence_to_text_array, PostgresValue};

/// Bind a `PostgresValue` to any sqlx query type
///
/// Collections are prepared as hstore text first; the enclosing function
/// must return `Result<_, StorehausError>`.
macro_rules! bind_pg_value {
    ($query:expr, $param:expr) => {
        match $param {
            PostgresValue::Text(s) => $query.bind(s),
            PostgresValue::Integer(i) => $query.bind(i),
            PostgresValue::BigInt(i) => $query.bind(i),
            PostgresValue::SmallInt(i) => $query.bind(i),
            PostgresValue::Float(f) => $query.bind(f),
            PostgresValue::Boolean(b) => $query.bind(b),
            PostgresValue::Uuid(u) => $query.bind(u),
            PostgresValue::Date(d) => $query.bind(d),
            PostgresValue::Timestamp(ts) => $query.bind(ts),
            PostgresValue::Decimal(s) => $query.bind(s),
            PostgresValue::TextArray(items) => $query.bind(items),
            PostgresValue::Array(items) => {
                $query.bind(sequence_to_text_array(&PostgresValue::Array(items))?)
            }
            PostgresValue::HStore(map) => $query.bind(to_pg_hstore(map)),
            PostgresValue::Record(record) => $query.bind(to_pg_hstore(record_to_hstore(&record)?)),
            PostgresValue::Null => $query.bind(Option::<String>::None),
        }
    };
}

fn to_pg_hstore(map: BTreeMap<String, String>) -> PgHstore {
    PgHstore(map.into_iter().map(|(k, v)| (k, Some(v))).collect())
}

/// NULL values inside an hstore are dropped
fn from_pg_hstore(hstore: PgHstore) -> BTreeMap<String, String> {
    hstore
        .0
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect()
}

impl HStoreManager {
    /// Sorted keys of the first row matching `query`
    pub async fn hkeys(&self, attr: &str, query: &QueryBuilder) -> Result<Vec<String>, StorehausError> {
        let attr = self.attr(attr)?;
        let (sql, params) = self.statements().hkeys(&attr, query)?;
        crate::debug_log!("hkeys: {}", sql);

        let mut q = sqlx::query_scalar::<_, Option<Vec<String>>>(&sql);
        for param in params {
            q = bind_pg_value!(q, param);
        }
        let mut keys = q
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|e| StorehausError::database_operation(self.table_name(), "hkeys", e))?
            .flatten()
            .unwrap_or_default();
        keys.sort();
        Ok(keys)
    }

    /// Value under `key` in the first row matching `query`
    pub async fn hpeek(
        &self,
        attr: &str,
        key: &str,
        query: &QueryBuilder,
    ) -> Result<Option<String>, StorehausError> {
        let attr = self.attr(attr)?;
        let (sql, params) = self.statements().hpeek(&attr, key, query)?;
        crate::debug_log!("hpeek: {}", sql);

        let mut q = sqlx::query_scalar::<_, Option<String>>(&sql);
        for param in params {
            q = bind_pg_value!(q, param);
        }
        let value = q
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|e| StorehausError::database_operation(self.table_name(), "hpeek", e))?;
        Ok(value.flatten())
    }

    /// Sub-map of `keys` in the first row matching `query`
    pub async fn hslice(
        &self,
        attr: &str,
        keys: &[&str],
        query: &QueryBuilder,
    ) -> Result<BTreeMap<String, String>, StorehausError> {
        let attr = self.attr(attr)?;
        let (sql, params) = self.statements().hslice(&attr, keys, query)?;
        crate::debug_log!("hslice: {}", sql);

        let mut q = sqlx::query_scalar::<_, Option<PgHstore>>(&sql);
        for param in params {
            q = bind_pg_value!(q, param);
        }
        let slice = q
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|e| StorehausError::database_operation(self.table_name(), "hslice", e))?;
        Ok(slice.flatten().map(from_pg_hstore).unwrap_or_default())
    }

    /// Delete `keys` from every row matching `query`, returning the rows affected
    pub async fn hremove(
        &self,
        attr: &str,
        keys: &[&str],
        query: &QueryBuilder,
    ) -> Result<u64, StorehausError> {
        let attr = self.attr(attr)?;
        let (sql, params) = self.statements().hremove(&attr, keys, query)?;
        self.execute("hremove", &sql, params).await
    }

    /// Merge `values` into every row matching `query`, returning the rows affected
    pub async fn hupdate(
        &self,
        attr: &str,
        values: BTreeMap<String, String>,
        query: &QueryBuilder,
    ) -> Result<u64, StorehausError> {
        let attr = self.attr(attr)?;
        let (sql, params) = self
            .statements()
            .hupdate(&attr, PostgresValue::HStore(values), query)?;
        self.execute("hupdate", &sql, params).await
    }

    /// Number of rows matching `query`
    pub async fn count(&self, query: &QueryBuilder) -> Result<i64, StorehausError> {
        let (sql, params) = self.statements().count(query)?;

        let mut q = sqlx::query_scalar::<_, i64>(&sql);
        for param in params {
            q = bind_pg_value!(q, param);
        }
        q.fetch_one(&self.db_pool)
            .await
            .map_err(|e| StorehausError::database_operation(self.table_name(), "count", e))
    }

    /// Rows matching `query`
    pub async fn find<E>(&self, query: &QueryBuilder) -> Result<Vec<E>, StorehausError>
    where
        E: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let (sql, params) = self.statements().select(query)?;
        crate::debug_log!("find: {}", sql);

        let mut q = sqlx::query_as::<_, E>(&sql);
        for param in params {
            q = bind_pg_value!(q, param);
        }
        q.fetch_all(&self.db_pool)
            .await
            .map_err(|e| StorehausError::database_operation(self.table_name(), "find", e))
    }

    /// Column values of the rows matching `query`, bound to their rows
    ///
    /// NULL columns load as empty dictionaries.
    pub async fn fetch_dictionary(
        &self,
        attr: &str,
        query: &QueryBuilder,
    ) -> Result<Vec<HStoreDictionary>, StorehausError> {
        let attr = self.attr(attr)?;
        let (sql, params) = self.statements().fetch_dictionary(&attr, query)?;

        let mut q = sqlx::query_as::<_, (String, Option<PgHstore>)>(&sql);
        for param in params {
            q = bind_pg_value!(q, param);
        }
        let rows = q
            .fetch_all(&self.db_pool)
            .await
            .map_err(|e| StorehausError::database_operation(self.table_name(), "fetch_dictionary", e))?;

        Ok(rows
            .into_iter()
            .map(|(owner, value)| {
                let values = value.map(from_pg_hstore).unwrap_or_default();
                HStoreDictionary::new(attr.as_str(), values).with_owner(UniversalId::String(owner))
            })
            .collect())
    }

    /// Reference stored under `key` in the first row matching `query`
    pub async fn hpeek_reference<E: Referenceable>(
        &self,
        attr: &str,
        key: &str,
        query: &QueryBuilder,
        format: &ReferenceFormat,
    ) -> Result<Option<LazyReference<E>>, StorehausError> {
        let raw = self.hpeek(attr, key, query).await?;
        Ok(raw.map(|raw| {
            let mut values = BTreeMap::new();
            values.insert(key.to_string(), raw);
            deserialize_references::<E>(&values, format)
                .remove(key)
                .unwrap_or_else(|| LazyReference::new(None))
        }))
    }

    /// References stored under `keys` in the first row matching `query`
    pub async fn hslice_references<E: Referenceable>(
        &self,
        attr: &str,
        keys: &[&str],
        query: &QueryBuilder,
        format: &ReferenceFormat,
    ) -> Result<BTreeMap<String, LazyReference<E>>, StorehausError> {
        let values = self.hslice(attr, keys, query).await?;
        Ok(deserialize_references(&values, format))
    }

    async fn execute(
        &self,
        operation: &str,
        sql: &str,
        params: Vec<PostgresValue>,
    ) -> Result<u64, StorehausError> {
        crate::debug_log!("{}: {}", operation, sql);

        let mut q = sqlx::query(sql);
        for param in params {
            q = bind_pg_value!(q, param);
        }
        let result = q
            .execute(&self.db_pool)
            .await
            .map_err(|e| StorehausError::database_operation(self.table_name(), operation, e))?;
        Ok(result.rows_affected())
    }
}
