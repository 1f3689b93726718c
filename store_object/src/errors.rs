use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorehausError {
    /// Structurally malformed lookup path (unsupported nesting, unknown lookup name)
    #[error("Invalid lookup: {0}")]
    InvalidLookup(String),

    /// A valid lookup applied to a value of the wrong shape
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl StorehausError {
    pub fn invalid_lookup(message: impl Into<String>) -> Self {
        Self::InvalidLookup(message.into())
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue(message.into())
    }

    /// Wrap a driver error with the table and operation it happened in
    pub fn database_operation(table: &str, operation: &str, error: sqlx::Error) -> Self {
        Self::DatabaseError(format!("{} on '{}' failed: {}", operation, table, error))
    }

    /// Whether this error was caused by the lookup path or value rather than the database
    pub fn is_lookup_error(&self) -> bool {
        matches!(self, Self::InvalidLookup(_) | Self::InvalidValue(_))
    }
}

impl From<ValidationError> for StorehausError {
    fn from(error: ValidationError) -> Self {
        Self::ValidationError(error.to_string())
    }
}

impl From<type_mapping::HStoreConversionError> for StorehausError {
    fn from(error: type_mapping::HStoreConversionError) -> Self {
        Self::InvalidValue(error.to_string())
    }
}
