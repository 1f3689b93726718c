//! SQL text for hstore manager operations
//!
//! Statements that bind their own parameters put them first; the WHERE
//! clause is numbered after them.

use crate::errors::StorehausError;
use crate::query_builder::QueryBuilder;
use crate::validation::{ValidatedFieldName, ValidatedTableName};
use type_mapping::PostgresValue;

/// A statement and the parameters to bind, in order
pub type Statement = (String, Vec<PostgresValue>);

/// Builds manager statements for one table
#[derive(Debug, Clone, Copy)]
pub struct HStoreStatements<'a> {
    table: &'a ValidatedTableName,
    primary_key: &'a ValidatedFieldName,
}

impl<'a> HStoreStatements<'a> {
    pub fn new(table: &'a ValidatedTableName, primary_key: &'a ValidatedFieldName) -> Self {
        Self { table, primary_key }
    }

    /// Keys of the first matching row
    pub fn hkeys(&self, attr: &ValidatedFieldName, query: &QueryBuilder) -> Result<Statement, StorehausError> {
        let head = format!("SELECT akeys({}) FROM {}", attr, self.table);
        self.finish(head, Vec::new(), query, " LIMIT 1")
    }

    /// Value under `key` in the first matching row
    pub fn hpeek(
        &self,
        attr: &ValidatedFieldName,
        key: &str,
        query: &QueryBuilder,
    ) -> Result<Statement, StorehausError> {
        let head = format!("SELECT ({} -> $1) FROM {}", attr, self.table);
        self.finish(head, vec![PostgresValue::Text(key.to_string())], query, " LIMIT 1")
    }

    /// Sub-map of `keys` in the first matching row
    pub fn hslice(
        &self,
        attr: &ValidatedFieldName,
        keys: &[&str],
        query: &QueryBuilder,
    ) -> Result<Statement, StorehausError> {
        let head = format!("SELECT slice({}, $1) FROM {}", attr, self.table);
        self.finish(head, vec![Self::key_array(keys)], query, " LIMIT 1")
    }

    /// Delete `keys` from every matching row
    pub fn hremove(
        &self,
        attr: &ValidatedFieldName,
        keys: &[&str],
        query: &QueryBuilder,
    ) -> Result<Statement, StorehausError> {
        let head = format!(
            "UPDATE {} SET {attr} = delete({attr}, $1::text[])",
            self.table,
            attr = attr
        );
        self.finish(head, vec![Self::key_array(keys)], query, "")
    }

    /// Merge `values` into every matching row; NULL columns start empty
    pub fn hupdate(
        &self,
        attr: &ValidatedFieldName,
        values: PostgresValue,
        query: &QueryBuilder,
    ) -> Result<Statement, StorehausError> {
        let head = format!(
            "UPDATE {} SET {attr} = COALESCE({attr}, ''::hstore) || $1",
            self.table,
            attr = attr
        );
        self.finish(head, vec![values], query, "")
    }

    pub fn count(&self, query: &QueryBuilder) -> Result<Statement, StorehausError> {
        let head = format!("SELECT COUNT(*) AS total FROM {}", self.table);
        self.finish(head, Vec::new(), query, "")
    }

    pub fn select(&self, query: &QueryBuilder) -> Result<Statement, StorehausError> {
        let head = format!("SELECT * FROM {}", self.table);
        self.finish(head, Vec::new(), query, "")
    }

    /// Column value of every matching row together with its primary key
    pub fn fetch_dictionary(
        &self,
        attr: &ValidatedFieldName,
        query: &QueryBuilder,
    ) -> Result<Statement, StorehausError> {
        let head = format!(
            "SELECT {}::text AS owner, {} AS value FROM {}",
            self.primary_key, attr, self.table
        );
        self.finish(head, Vec::new(), query, "")
    }

    fn key_array(keys: &[&str]) -> PostgresValue {
        PostgresValue::TextArray(keys.iter().map(|k| k.to_string()).collect())
    }

    fn finish(
        &self,
        head: String,
        mut params: Vec<PostgresValue>,
        query: &QueryBuilder,
        tail: &str,
    ) -> Result<Statement, StorehausError> {
        let first_param = params.len() as i32 + 1;
        let (where_clause, where_params) = query.build_where_clause_from(first_param)?;
        params.extend(where_params);

        let mut sql = head;
        if !where_clause.is_empty() {
            sql.push(' ');
            sql.push_str(&where_clause);
        }
        sql.push_str(tail);
        Ok((sql, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_builder::QueryFilter;

    fn names() -> (ValidatedTableName, ValidatedFieldName, ValidatedFieldName) {
        (
            ValidatedTableName::new("items").unwrap(),
            ValidatedFieldName::new("id").unwrap(),
            ValidatedFieldName::new("data").unwrap(),
        )
    }

    #[test]
    fn test_hkeys_without_filter() {
        let (table, pk, attr) = names();
        let statements = HStoreStatements::new(&table, &pk);
        let (sql, params) = statements.hkeys(&attr, &QueryBuilder::new()).unwrap();
        assert_eq!(sql, "SELECT akeys(data) FROM items LIMIT 1");
        assert!(params.is_empty());
    }

    #[test]
    fn test_hpeek_numbers_where_after_key() {
        let (table, pk, attr) = names();
        let statements = HStoreStatements::new(&table, &pk);
        let query = QueryBuilder::new().filter(QueryFilter::eq("name", "a"));

        let (sql, params) = statements.hpeek(&attr, "v", &query).unwrap();
        assert_eq!(
            sql,
            "SELECT (data -> $1) FROM items WHERE name = $2 LIMIT 1"
        );
        assert_eq!(params, vec![PostgresValue::from("v"), PostgresValue::from("a")]);
    }

    #[test]
    fn test_hslice_and_hremove_bind_key_arrays() {
        let (table, pk, attr) = names();
        let statements = HStoreStatements::new(&table, &pk);
        let query = QueryBuilder::new().hstore("data__v__asint__gt", 1).unwrap();

        let (sql, params) = statements.hslice(&attr, &["a", "b"], &query).unwrap();
        assert_eq!(
            sql,
            "SELECT slice(data, $1) FROM items WHERE (data -> $2)::INTEGER > $3 LIMIT 1"
        );
        assert_eq!(
            params,
            vec![
                PostgresValue::TextArray(vec!["a".to_string(), "b".to_string()]),
                PostgresValue::from("v"),
                PostgresValue::Integer(1),
            ]
        );

        let (sql, _) = statements.hremove(&attr, &["a"], &QueryBuilder::new()).unwrap();
        assert_eq!(sql, "UPDATE items SET data = delete(data, $1::text[])");
    }

    #[test]
    fn test_hupdate_merges_into_existing_value() {
        let (table, pk, attr) = names();
        let statements = HStoreStatements::new(&table, &pk);
        let query = QueryBuilder::new().filter(QueryFilter::eq("id", 5));

        let (sql, params) = statements
            .hupdate(&attr, PostgresValue::HStore(Default::default()), &query)
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE items SET data = COALESCE(data, ''::hstore) || $1 WHERE id = $2"
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_count_select_and_dictionary() {
        let (table, pk, attr) = names();
        let statements = HStoreStatements::new(&table, &pk);
        let query = QueryBuilder::new().hstore("data__contains", "a").unwrap();

        let (sql, _) = statements.count(&query).unwrap();
        assert_eq!(sql, "SELECT COUNT(*) AS total FROM items WHERE data ? $1");

        let (sql, _) = statements.select(&QueryBuilder::new()).unwrap();
        assert_eq!(sql, "SELECT * FROM items");

        let (sql, _) = statements.fetch_dictionary(&attr, &query).unwrap();
        assert_eq!(
            sql,
            "SELECT id::text AS owner, data AS value FROM items WHERE data ? $1"
        );
    }

    #[test]
    fn test_lookup_errors_surface() {
        let (table, pk, _) = names();
        let statements = HStoreStatements::new(&table, &pk);
        let err = QueryBuilder::new().hstore("data__exact__x", 1).unwrap_err();
        assert!(matches!(err, StorehausError::InvalidLookup(_)));

        let query = QueryBuilder::new().filter(QueryFilter::in_values("id", vec![]));
        let err = statements.count(&query).unwrap_err();
        assert!(matches!(err, StorehausError::InvalidValue(_)));
    }
}
