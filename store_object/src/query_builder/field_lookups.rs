//! Comparison lookups per semantic field kind
//!
//! Keyed hstore lookups extract a text value, optionally cast it, and then
//! delegate the comparison to the lookup registered for the resulting kind.

use crate::errors::StorehausError;
use crate::query_builder::filter::QueryOperator;
use crate::query_builder::sql_generation::SqlFragment;
use crate::traits::LookupRegistry;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;
use type_mapping::{to_hstore_text, PostgresValue, HSTORE_DATE_FORMAT};

/// Semantic type of a value extracted from an hstore column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Integer,
    Date,
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Date => "date",
        }
    }

    /// Convert a comparison operand to the type this kind compares against
    pub fn prepare(&self, value: &PostgresValue) -> Result<PostgresValue, StorehausError> {
        let mismatch = || {
            StorehausError::invalid_value(format!(
                "cannot compare a {} value with a {}",
                self.name(),
                value.shape()
            ))
        };

        match self {
            FieldKind::Text => to_hstore_text(value).map(PostgresValue::Text).ok_or_else(mismatch),
            FieldKind::Integer => match value {
                PostgresValue::Integer(i) => Ok(PostgresValue::Integer(*i)),
                PostgresValue::SmallInt(i) => Ok(PostgresValue::Integer(i32::from(*i))),
                PostgresValue::BigInt(i) => i32::try_from(*i)
                    .map(PostgresValue::Integer)
                    .map_err(|_| mismatch()),
                PostgresValue::Text(s) => s
                    .trim()
                    .parse::<i32>()
                    .map(PostgresValue::Integer)
                    .map_err(|_| mismatch()),
                _ => Err(mismatch()),
            },
            FieldKind::Date => match value {
                PostgresValue::Date(d) => Ok(PostgresValue::Date(*d)),
                PostgresValue::Timestamp(ts) => Ok(PostgresValue::Date(ts.date_naive())),
                PostgresValue::Text(s) => NaiveDate::parse_from_str(s.trim(), HSTORE_DATE_FORMAT)
                    .map(PostgresValue::Date)
                    .map_err(|_| mismatch()),
                _ => Err(mismatch()),
            },
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named comparison applicable to one field kind
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLookup {
    name: String,
    operator: QueryOperator,
}

impl FieldLookup {
    pub fn new(name: impl Into<String>, operator: QueryOperator) -> Self {
        Self {
            name: name.into(),
            operator,
        }
    }

    /// Custom lookup rendered from a template such as `"{lhs} <> %s"`
    pub fn template(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self::new(name, QueryOperator::Template(template.into()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operator(&self) -> &QueryOperator {
        &self.operator
    }

    /// Render the comparison against `lhs`, preparing the operand for `kind`
    pub fn render(
        &self,
        lhs: &str,
        kind: FieldKind,
        value: &PostgresValue,
    ) -> Result<SqlFragment, StorehausError> {
        let prepared = match (&self.operator, value) {
            (QueryOperator::IsNull | QueryOperator::IsNotNull, _) => value.clone(),
            (op, PostgresValue::Array(items)) if op.takes_sequence() => PostgresValue::Array(
                items
                    .iter()
                    .map(|item| kind.prepare(item))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            (op, PostgresValue::TextArray(items)) if op.takes_sequence() => PostgresValue::Array(
                items
                    .iter()
                    .map(|item| kind.prepare(&PostgresValue::Text(item.clone())))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            (op, _) if op.takes_sequence() => {
                return Err(StorehausError::invalid_value(format!(
                    "`{}` lookup expects a sequence, got {}",
                    self.name,
                    value.shape()
                )))
            }
            _ => kind.prepare(value)?,
        };

        self.operator.render(lhs, Some(&prepared))
    }
}

/// Registry of comparison lookups keyed by field kind and lookup name
#[derive(Debug, Clone, Default)]
pub struct FieldLookupRegistry {
    lookups: HashMap<FieldKind, HashMap<String, FieldLookup>>,
}

impl FieldLookupRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in lookups for every field kind
    pub fn with_defaults() -> Self {
        const COMPARISONS: &[&str] = &["exact", "gt", "gte", "lt", "lte", "in", "range", "isnull"];
        const TEXT_ONLY: &[&str] = &[
            "iexact",
            "contains",
            "icontains",
            "startswith",
            "istartswith",
            "endswith",
            "iendswith",
            "regex",
            "iregex",
        ];

        let mut registry = Self::new();
        for kind in [FieldKind::Text, FieldKind::Integer, FieldKind::Date] {
            for name in COMPARISONS {
                registry.register_builtin(kind, name);
            }
        }
        for name in TEXT_ONLY {
            registry.register_builtin(FieldKind::Text, name);
        }
        registry
    }

    fn register_builtin(&mut self, kind: FieldKind, name: &str) {
        if let Some(operator) = QueryOperator::from_lookup_name(name) {
            self.register_lookup(kind, FieldLookup::new(name, operator));
        }
    }

    /// Add or replace a lookup for `kind`
    pub fn register_lookup(&mut self, kind: FieldKind, lookup: FieldLookup) {
        crate::debug_log!("Registering lookup '{}' for {} fields", lookup.name(), kind);
        self.lookups
            .entry(kind)
            .or_default()
            .insert(lookup.name().to_string(), lookup);
    }

    /// Remove a lookup, returning it if it was registered
    pub fn unregister_lookup(&mut self, kind: FieldKind, name: &str) -> Option<FieldLookup> {
        self.lookups.get_mut(&kind)?.remove(name)
    }

    pub fn has_lookup(&self, kind: FieldKind, name: &str) -> bool {
        self.lookups
            .get(&kind)
            .is_some_and(|lookups| lookups.contains_key(name))
    }

    /// Sorted lookup names registered for `kind`
    pub fn lookup_names(&self, kind: FieldKind) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .lookups
            .get(&kind)
            .map(|lookups| lookups.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }
}

impl LookupRegistry for FieldLookupRegistry {
    fn get_lookup(&self, kind: FieldKind, name: &str) -> Option<FieldLookup> {
        self.lookups.get(&kind)?.get(name).cloned()
    }
}

/// Process-wide registry with the built-in lookups
pub fn default_registry() -> &'static FieldLookupRegistry {
    static REGISTRY: OnceLock<FieldLookupRegistry> = OnceLock::new();
    REGISTRY.get_or_init(FieldLookupRegistry::with_defaults)
}
