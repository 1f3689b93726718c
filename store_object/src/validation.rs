//! Identifier validation
//!
//! Table and column names are interpolated into hstore statements, so they
//! are checked here before any SQL is built. Column names also appear as
//! the first segment of lookup paths (`data__size__asint`), which keeps the
//! lookup separator out of them.

use crate::query_builder::LOOKUP_SEP;
use std::fmt;
use thiserror::Error;

/// PostgreSQL truncates identifiers longer than this
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Words that cannot name a table or column without quoting
const RESERVED_KEYWORDS: &[&str] = &[
    "ALL", "AND", "ANY", "AS", "ASC", "CASE", "CAST", "CHECK", "COLUMN", "CREATE", "DEFAULT",
    "DELETE", "DESC", "DISTINCT", "DROP", "ELSE", "END", "FALSE", "FROM", "GRANT", "GROUP",
    "HAVING", "HSTORE", "IN", "INSERT", "INTO", "IS", "JOIN", "LIKE", "LIMIT", "NOT", "NULL",
    "OFFSET", "ON", "OR", "ORDER", "SELECT", "SET", "TABLE", "THEN", "TRUE", "UNION", "UPDATE",
    "USER", "USING", "WHEN", "WHERE",
];

/// Validation errors for database identifiers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} name cannot be empty")]
    Empty(IdentifierKind),

    #[error("{kind} name '{name}' is too long: {length} characters (max 63)")]
    TooLong {
        kind: IdentifierKind,
        name: String,
        length: usize,
    },

    #[error("{kind} name '{name}' must start with a letter or underscore")]
    InvalidStartCharacter { kind: IdentifierKind, name: String },

    #[error("{kind} name '{name}' may only contain letters, digits and underscores")]
    InvalidCharacters { kind: IdentifierKind, name: String },

    #[error("{kind} name '{name}' is a reserved SQL keyword")]
    ReservedKeyword { kind: IdentifierKind, name: String },

    #[error("column name '{0}' contains the lookup separator '__'")]
    LookupSeparator(String),
}

/// What an identifier names, for error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Schema,
    Table,
    Column,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IdentifierKind::Schema => "schema",
            IdentifierKind::Table => "table",
            IdentifierKind::Column => "column",
        })
    }
}

fn validate_identifier(name: &str, kind: IdentifierKind) -> Result<(), ValidationError> {
    let Some(first) = name.chars().next() else {
        return Err(ValidationError::Empty(kind));
    };
    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ValidationError::TooLong {
            kind,
            name: name.to_string(),
            length: name.len(),
        });
    }
    if !first.is_ascii_alphabetic() && first != '_' {
        return Err(ValidationError::InvalidStartCharacter {
            kind,
            name: name.to_string(),
        });
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::InvalidCharacters {
            kind,
            name: name.to_string(),
        });
    }
    if RESERVED_KEYWORDS.contains(&name.to_ascii_uppercase().as_str()) {
        return Err(ValidationError::ReservedKeyword {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

/// A table name, optionally schema-qualified (`archive.bags`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedTableName(String);

impl ValidatedTableName {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        match name.split_once('.') {
            Some((schema, table)) => {
                validate_identifier(schema, IdentifierKind::Schema)?;
                validate_identifier(table, IdentifierKind::Table)?;
            }
            None => validate_identifier(name, IdentifierKind::Table)?,
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidatedTableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A column name usable both in SQL and as the head of a lookup path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedFieldName(String);

impl ValidatedFieldName {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        validate_identifier(name, IdentifierKind::Column)?;
        if name.contains(LOOKUP_SEP) {
            return Err(ValidationError::LookupSeparator(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidatedFieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_table_names() {
        for name in ["bags", "data_bags", "_scratch", "Bags2", "archive.bags", &"a".repeat(63)] {
            assert!(ValidatedTableName::new(name).is_ok(), "should accept {}", name);
        }
    }

    #[test]
    fn test_invalid_table_names() {
        let cases = [
            ("", ValidationError::Empty(IdentifierKind::Table)),
            (
                "2bags",
                ValidationError::InvalidStartCharacter {
                    kind: IdentifierKind::Table,
                    name: "2bags".to_string(),
                },
            ),
            (
                "bad table",
                ValidationError::InvalidCharacters {
                    kind: IdentifierKind::Table,
                    name: "bad table".to_string(),
                },
            ),
            (
                "hstore",
                ValidationError::ReservedKeyword {
                    kind: IdentifierKind::Table,
                    name: "hstore".to_string(),
                },
            ),
            (
                ".bags",
                ValidationError::Empty(IdentifierKind::Schema),
            ),
            (
                "a.b.c",
                ValidationError::InvalidCharacters {
                    kind: IdentifierKind::Table,
                    name: "b.c".to_string(),
                },
            ),
        ];

        for (name, expected) in cases {
            assert_eq!(ValidatedTableName::new(name).unwrap_err(), expected, "{}", name);
        }
    }

    #[test]
    fn test_too_long_name() {
        let err = ValidatedTableName::new(&"a".repeat(64)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { length: 64, .. }));
        assert!(err.to_string().contains("max 63"));
    }

    #[test]
    fn test_field_names_exclude_lookup_separator() {
        assert!(ValidatedFieldName::new("data").is_ok());
        assert!(ValidatedFieldName::new("_refs").is_ok());
        assert_eq!(
            ValidatedFieldName::new("my__data").unwrap_err(),
            ValidationError::LookupSeparator("my__data".to_string())
        );
        assert!(matches!(
            ValidatedFieldName::new("archive.data"),
            Err(ValidationError::InvalidCharacters { .. })
        ));
        assert!(matches!(
            ValidatedFieldName::new("data -> 'k'"),
            Err(ValidationError::InvalidCharacters { .. })
        ));
    }

    #[test]
    fn test_reserved_keywords_any_case() {
        for keyword in ["select", "FROM", "Where", "hstore", "null"] {
            assert!(matches!(
                ValidatedFieldName::new(keyword),
                Err(ValidationError::ReservedKeyword { .. })
            ));
        }
    }

    #[test]
    fn test_display() {
        let table = ValidatedTableName::new("archive.bags").unwrap();
        assert_eq!(table.to_string(), "archive.bags");
        assert_eq!(ValidatedFieldName::new("data").unwrap().to_string(), "data");
    }
}
