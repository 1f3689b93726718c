//! Query builder
//!
//! Collects filters for the hstore manager statements.

use crate::errors::StorehausError;
use crate::query_builder::filter::QueryFilter;
use crate::query_builder::sql_generation::SqlGenerator;
use type_mapping::PostgresValue;

/// Query builder for filtering rows of an hstore table
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    pub(crate) conditions: Vec<QueryFilter>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter condition
    pub fn filter(mut self, filter: QueryFilter) -> Self {
        self.conditions.push(filter);
        self
    }

    /// Add multiple filters (combined with AND)
    pub fn filters(mut self, filters: Vec<QueryFilter>) -> Self {
        self.conditions.extend(filters);
        self
    }

    /// Add an hstore lookup such as `data__size__asint__gt`
    pub fn hstore(self, path: &str, value: impl Into<PostgresValue>) -> Result<Self, StorehausError> {
        Ok(self.filter(QueryFilter::hstore(path, value)?))
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Build WHERE clause with parameters numbered from `$1`
    pub fn build_where_clause(&self) -> Result<(String, Vec<PostgresValue>), StorehausError> {
        SqlGenerator::build_where_clause(&self.conditions)
    }

    /// Build WHERE clause with parameters numbered from `first_param`
    pub fn build_where_clause_from(
        &self,
        first_param: i32,
    ) -> Result<(String, Vec<PostgresValue>), StorehausError> {
        SqlGenerator::build_where_clause_from(&self.conditions, first_param)
    }
}
