//! SQL generation
//!
//! Lookups render to fragments with `%s` placeholders; this module turns
//! them into numbered PostgreSQL parameters when a WHERE clause is built.

use crate::errors::StorehausError;
use crate::query_builder::filter::{LogicalOperator, QueryFilter};
use std::fmt::Write;
use type_mapping::PostgresValue;

/// Placeholder used inside rendered fragments
pub const PLACEHOLDER: &str = "%s";

/// A boolean SQL expression and the parameters its placeholders bind, in order
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFragment {
    pub sql: String,
    pub params: Vec<PostgresValue>,
}

impl SqlFragment {
    /// Fragments may be partial: an extraction key placed in `lhs` is bound
    /// by the caller that assembles the complete expression.
    pub fn new(sql: impl Into<String>, params: Vec<PostgresValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Number of `%s` placeholders in the SQL text
    pub fn placeholder_count(&self) -> usize {
        self.sql.matches(PLACEHOLDER).count()
    }

    /// Whether every placeholder has exactly one parameter
    pub fn is_complete(&self) -> bool {
        self.placeholder_count() == self.params.len()
    }

    /// Rewrite `%s` placeholders as `$n`, advancing `param_counter` once per placeholder
    pub fn numbered(&self, param_counter: &mut i32) -> String {
        let mut pieces = self.sql.split(PLACEHOLDER);
        let mut sql = String::with_capacity(self.sql.len() + 4 * self.params.len());

        if let Some(first) = pieces.next() {
            sql.push_str(first);
        }
        for piece in pieces {
            let _ = write!(sql, "${}", param_counter);
            *param_counter += 1;
            sql.push_str(piece);
        }

        sql
    }
}

pub struct SqlGenerator;

impl SqlGenerator {
    /// Build WHERE clause from conditions, numbering parameters from `$1`
    pub fn build_where_clause(
        conditions: &[QueryFilter],
    ) -> Result<(String, Vec<PostgresValue>), StorehausError> {
        Self::build_where_clause_from(conditions, 1)
    }

    /// Build WHERE clause from conditions, numbering parameters from `first_param`
    ///
    /// Statements that bind their own parameters before the WHERE clause pass
    /// the next free position here.
    pub fn build_where_clause_from(
        conditions: &[QueryFilter],
        first_param: i32,
    ) -> Result<(String, Vec<PostgresValue>), StorehausError> {
        if conditions.is_empty() {
            return Ok((String::new(), Vec::new()));
        }

        let mut values = Vec::new();
        let mut param_counter = first_param;

        let parts = conditions
            .iter()
            .map(|condition| Self::build_condition_sql(condition, &mut values, &mut param_counter))
            .collect::<Result<Vec<_>, _>>()?;

        let conditions_sql = parts
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" AND ");

        if conditions_sql.is_empty() {
            Ok((String::new(), values))
        } else {
            Ok((format!("WHERE {}", conditions_sql), values))
        }
    }

    fn build_condition_sql(
        filter: &QueryFilter,
        values: &mut Vec<PostgresValue>,
        param_counter: &mut i32,
    ) -> Result<String, StorehausError> {
        match filter {
            QueryFilter::Condition(condition) => {
                let fragment = condition
                    .operator
                    .render(&condition.field, condition.value.as_ref())?;
                Self::append_fragment(&fragment, values, param_counter)
            }
            QueryFilter::Lookup(fragment) => Self::append_fragment(fragment, values, param_counter),
            QueryFilter::Group { operator, filters } => {
                let operator_str = match operator {
                    LogicalOperator::And => " AND ",
                    LogicalOperator::Or => " OR ",
                };

                let mut group_conditions = Vec::with_capacity(filters.len());
                for f in filters {
                    let sql = Self::build_condition_sql(f, values, param_counter)?;
                    if !sql.is_empty() {
                        group_conditions.push(sql);
                    }
                }

                Ok(match group_conditions.len() {
                    0 => String::new(),
                    1 => group_conditions.remove(0),
                    _ => format!("({})", group_conditions.join(operator_str)),
                })
            }
        }
    }

    fn append_fragment(
        fragment: &SqlFragment,
        values: &mut Vec<PostgresValue>,
        param_counter: &mut i32,
    ) -> Result<String, StorehausError> {
        if !fragment.is_complete() {
            return Err(StorehausError::invalid_lookup(format!(
                "fragment `{}` has {} placeholders for {} parameters",
                fragment.sql,
                fragment.placeholder_count(),
                fragment.params.len()
            )));
        }
        let sql = fragment.numbered(param_counter);
        values.extend(fragment.params.iter().cloned());
        Ok(sql)
    }
}
