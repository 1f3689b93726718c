//! Query filters and comparison operators
//!
//! Every operator renders itself against an arbitrary left-hand SQL
//! expression, so the same set serves plain columns and values extracted
//! from an hstore column by key.

use crate::errors::StorehausError;
use crate::hstore::HStoreField;
use crate::query_builder::sql_generation::{SqlFragment, PLACEHOLDER};
use type_mapping::PostgresValue;

/// Query condition operators
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOperator {
    Eq,          // =
    Ne,          // !=
    Gt,          // >
    Gte,         // >=
    Lt,          // <
    Lte,         // <=
    IExact,      // UPPER(lhs) = UPPER(value)
    Like,        // LIKE (raw pattern)
    ILike,       // ILIKE (raw pattern)
    Contains,    // LIKE '%value%'
    IContains,   // UPPER(lhs) LIKE UPPER('%value%')
    StartsWith,  // LIKE 'value%'
    IStartsWith, // UPPER(lhs) LIKE UPPER('value%')
    EndsWith,    // LIKE '%value'
    IEndsWith,   // UPPER(lhs) LIKE UPPER('%value')
    Regex,       // ~
    IRegex,      // ~*
    In,          // IN
    NotIn,       // NOT IN
    Range,       // BETWEEN
    IsNull,      // IS NULL, or IS NOT NULL for a `false` operand
    IsNotNull,   // IS NOT NULL
    /// Custom comparison; `{lhs}` is replaced by the left-hand side and the
    /// single `%s` binds the operand
    Template(String),
}

impl QueryOperator {
    /// Operator registered under a lookup name (`gt`, `icontains`, ...)
    pub fn from_lookup_name(name: &str) -> Option<Self> {
        let operator = match name {
            "exact" => QueryOperator::Eq,
            "iexact" => QueryOperator::IExact,
            "gt" => QueryOperator::Gt,
            "gte" => QueryOperator::Gte,
            "lt" => QueryOperator::Lt,
            "lte" => QueryOperator::Lte,
            "in" => QueryOperator::In,
            "range" => QueryOperator::Range,
            "isnull" => QueryOperator::IsNull,
            "contains" => QueryOperator::Contains,
            "icontains" => QueryOperator::IContains,
            "startswith" => QueryOperator::StartsWith,
            "istartswith" => QueryOperator::IStartsWith,
            "endswith" => QueryOperator::EndsWith,
            "iendswith" => QueryOperator::IEndsWith,
            "regex" => QueryOperator::Regex,
            "iregex" => QueryOperator::IRegex,
            _ => return None,
        };
        Some(operator)
    }

    /// Whether the operand is a sequence of values rather than a single one
    pub fn takes_sequence(&self) -> bool {
        matches!(
            self,
            QueryOperator::In | QueryOperator::NotIn | QueryOperator::Range
        )
    }

    /// Render `lhs <op> operand` with `%s` placeholders
    ///
    /// Placeholders always follow `lhs`, so parameters bound inside `lhs`
    /// keep their position ahead of the operand's.
    pub fn render(
        &self,
        lhs: &str,
        value: Option<&PostgresValue>,
    ) -> Result<SqlFragment, StorehausError> {
        let p = PLACEHOLDER;
        match self {
            QueryOperator::Eq => match value {
                None | Some(PostgresValue::Null) => Ok(SqlFragment::new(format!("{} IS NULL", lhs), vec![])),
                Some(v) => Ok(SqlFragment::new(format!("{} = {}", lhs, p), vec![v.clone()])),
            },
            QueryOperator::Ne => match value {
                None | Some(PostgresValue::Null) => Ok(SqlFragment::new(format!("{} IS NOT NULL", lhs), vec![])),
                Some(v) => Ok(SqlFragment::new(format!("{} != {}", lhs, p), vec![v.clone()])),
            },
            QueryOperator::Gt => self.binary(lhs, ">", value),
            QueryOperator::Gte => self.binary(lhs, ">=", value),
            QueryOperator::Lt => self.binary(lhs, "<", value),
            QueryOperator::Lte => self.binary(lhs, "<=", value),
            QueryOperator::Like => self.binary(lhs, "LIKE", value),
            QueryOperator::ILike => self.binary(lhs, "ILIKE", value),
            QueryOperator::Regex => self.binary(lhs, "~", value),
            QueryOperator::IRegex => self.binary(lhs, "~*", value),
            QueryOperator::IExact => {
                let v = self.required(value)?;
                Ok(SqlFragment::new(
                    format!("UPPER({}) = UPPER({})", lhs, p),
                    vec![v.clone()],
                ))
            }
            QueryOperator::Contains => self.pattern(lhs, value, "%", "%", false),
            QueryOperator::IContains => self.pattern(lhs, value, "%", "%", true),
            QueryOperator::StartsWith => self.pattern(lhs, value, "", "%", false),
            QueryOperator::IStartsWith => self.pattern(lhs, value, "", "%", true),
            QueryOperator::EndsWith => self.pattern(lhs, value, "%", "", false),
            QueryOperator::IEndsWith => self.pattern(lhs, value, "%", "", true),
            QueryOperator::In | QueryOperator::NotIn => {
                let items = self.sequence(value)?;
                if items.is_empty() {
                    return Err(StorehausError::invalid_value(format!(
                        "{:?} requires at least one value",
                        self
                    )));
                }
                let placeholders = vec![p; items.len()].join(", ");
                let keyword = if *self == QueryOperator::In { "IN" } else { "NOT IN" };
                Ok(SqlFragment::new(
                    format!("{} {} ({})", lhs, keyword, placeholders),
                    items,
                ))
            }
            QueryOperator::Range => {
                let items = self.sequence(value)?;
                if items.len() != 2 {
                    return Err(StorehausError::invalid_value(format!(
                        "Range requires exactly two bounds, got {}",
                        items.len()
                    )));
                }
                Ok(SqlFragment::new(
                    format!("{} BETWEEN {} AND {}", lhs, p, p),
                    items,
                ))
            }
            QueryOperator::IsNull => match value {
                None | Some(PostgresValue::Boolean(true)) => {
                    Ok(SqlFragment::new(format!("{} IS NULL", lhs), vec![]))
                }
                Some(PostgresValue::Boolean(false)) => {
                    Ok(SqlFragment::new(format!("{} IS NOT NULL", lhs), vec![]))
                }
                Some(other) => Err(StorehausError::invalid_value(format!(
                    "IsNull expects a boolean, got {}",
                    other.shape()
                ))),
            },
            QueryOperator::IsNotNull => Ok(SqlFragment::new(format!("{} IS NOT NULL", lhs), vec![])),
            QueryOperator::Template(template) => {
                // `lhs` may carry its own placeholder, so it is substituted once
                if template.matches(p).count() != 1 || template.matches("{lhs}").count() != 1 {
                    return Err(StorehausError::invalid_lookup(format!(
                        "lookup template `{}` must contain exactly one {{lhs}} and exactly one {}",
                        template, p
                    )));
                }
                let v = self.required(value)?;
                Ok(SqlFragment::new(template.replace("{lhs}", lhs), vec![v.clone()]))
            }
        }
    }

    fn required<'v>(&self, value: Option<&'v PostgresValue>) -> Result<&'v PostgresValue, StorehausError> {
        match value {
            None | Some(PostgresValue::Null) => Err(StorehausError::invalid_value(format!(
                "{:?} requires a value",
                self
            ))),
            Some(v) => Ok(v),
        }
    }

    fn binary(
        &self,
        lhs: &str,
        op: &str,
        value: Option<&PostgresValue>,
    ) -> Result<SqlFragment, StorehausError> {
        let v = self.required(value)?;
        Ok(SqlFragment::new(
            format!("{} {} {}", lhs, op, PLACEHOLDER),
            vec![v.clone()],
        ))
    }

    fn pattern(
        &self,
        lhs: &str,
        value: Option<&PostgresValue>,
        prefix: &str,
        suffix: &str,
        case_insensitive: bool,
    ) -> Result<SqlFragment, StorehausError> {
        let text = match self.required(value)? {
            PostgresValue::Text(s) => s,
            other => {
                return Err(StorehausError::invalid_value(format!(
                    "{:?} expects text, got {}",
                    self,
                    other.shape()
                )))
            }
        };
        let pattern = PostgresValue::Text(format!("{}{}{}", prefix, escape_like(text), suffix));
        let sql = if case_insensitive {
            format!("UPPER({}) LIKE UPPER({})", lhs, PLACEHOLDER)
        } else {
            format!("{} LIKE {}", lhs, PLACEHOLDER)
        };
        Ok(SqlFragment::new(sql, vec![pattern]))
    }

    fn sequence(&self, value: Option<&PostgresValue>) -> Result<Vec<PostgresValue>, StorehausError> {
        match self.required(value)? {
            PostgresValue::Array(items) => Ok(items.clone()),
            PostgresValue::TextArray(items) => {
                Ok(items.iter().cloned().map(PostgresValue::Text).collect())
            }
            other => Err(StorehausError::invalid_value(format!(
                "{:?} expects a sequence, got {}",
                self,
                other.shape()
            ))),
        }
    }
}

/// Escape LIKE wildcards so the operand matches literally
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Single condition in WHERE clause
#[derive(Debug, Clone)]
pub struct QueryCondition {
    pub field: String,
    pub operator: QueryOperator,
    pub value: Option<PostgresValue>, // None for IS NULL/IS NOT NULL
}

/// Logical operators for combining conditions
#[derive(Debug, Clone)]
pub enum LogicalOperator {
    And,
    Or,
}

/// Query filter that can be nested
#[derive(Debug, Clone)]
pub enum QueryFilter {
    Condition(QueryCondition),
    /// Lookup already rendered against its column (hstore lookups)
    Lookup(SqlFragment),
    Group {
        operator: LogicalOperator,
        filters: Vec<QueryFilter>,
    },
}

impl QueryFilter {
    /// Create a simple condition
    pub fn condition(field: &str, operator: QueryOperator, value: Option<PostgresValue>) -> Self {
        Self::Condition(QueryCondition {
            field: field.to_string(),
            operator,
            value,
        })
    }

    /// Lookup on an hstore column from a `column__key__cast__lookup` path
    ///
    /// `data` compares the whole column, `data__contains` tests containment,
    /// `data__v2__asint__gte` compares a single key.
    pub fn hstore(path: &str, value: impl Into<PostgresValue>) -> Result<Self, StorehausError> {
        let (column, lookup_path) = match path.split_once(crate::query_builder::LOOKUP_SEP) {
            Some((column, rest)) => (column, rest),
            None => (path, ""),
        };
        HStoreField::dictionary(column)?.filter(lookup_path, value)
    }

    /// Create AND group
    pub fn and(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::And,
            filters,
        }
    }

    /// Create OR group
    pub fn or(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::Or,
            filters,
        }
    }

    /// Equal condition
    pub fn eq(field: &str, value: impl Into<PostgresValue>) -> Self {
        Self::condition(field, QueryOperator::Eq, Some(value.into()))
    }

    /// Not equal condition
    pub fn ne(field: &str, value: impl Into<PostgresValue>) -> Self {
        Self::condition(field, QueryOperator::Ne, Some(value.into()))
    }

    /// Greater than condition
    pub fn gt(field: &str, value: impl Into<PostgresValue>) -> Self {
        Self::condition(field, QueryOperator::Gt, Some(value.into()))
    }

    /// Greater than or equal condition
    pub fn gte(field: &str, value: impl Into<PostgresValue>) -> Self {
        Self::condition(field, QueryOperator::Gte, Some(value.into()))
    }

    /// Less than condition
    pub fn lt(field: &str, value: impl Into<PostgresValue>) -> Self {
        Self::condition(field, QueryOperator::Lt, Some(value.into()))
    }

    /// Less than or equal condition
    pub fn lte(field: &str, value: impl Into<PostgresValue>) -> Self {
        Self::condition(field, QueryOperator::Lte, Some(value.into()))
    }

    /// LIKE condition
    pub fn like(field: &str, pattern: &str) -> Self {
        Self::condition(field, QueryOperator::Like, Some(pattern.into()))
    }

    /// ILIKE condition (case insensitive)
    pub fn ilike(field: &str, pattern: &str) -> Self {
        Self::condition(field, QueryOperator::ILike, Some(pattern.into()))
    }

    /// IN condition
    pub fn in_values(field: &str, values: Vec<PostgresValue>) -> Self {
        Self::condition(field, QueryOperator::In, Some(PostgresValue::Array(values)))
    }

    /// NOT IN condition
    pub fn not_in_values(field: &str, values: Vec<PostgresValue>) -> Self {
        Self::condition(field, QueryOperator::NotIn, Some(PostgresValue::Array(values)))
    }

    /// IS NULL condition
    pub fn is_null(field: &str) -> Self {
        Self::condition(field, QueryOperator::IsNull, None)
    }

    /// IS NOT NULL condition
    pub fn is_not_null(field: &str) -> Self {
        Self::condition(field, QueryOperator::IsNotNull, None)
    }
}
