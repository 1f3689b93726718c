//! Error types for the HStoreHaus crate
//!
//! This module contains all error types that can be returned by HStoreHaus operations.

use config::ConfigError;
use store_object::StorehausError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HStoreHausError {
    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] sqlx::Error),

    #[error(transparent)]
    Store(#[from] StorehausError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HStore manager not found: {0}")]
    ManagerNotFound(String),

    #[error("HStore manager already registered: {0}")]
    ManagerAlreadyRegistered(String),
}
