//! Convenience re-exports for common HStoreHaus usage
//!
//! This prelude module re-exports the most commonly used items from the HStoreHaus ecosystem,
//! making it easier to import everything you need with a single use statement.
//!
//! # Example
//!
//! ```rust
//! use hstorehaus::prelude::*;
//!
//! let field = HStoreField::dictionary("data").unwrap();
//! let filter = field.filter("size__asint__gte", 10).unwrap();
//! ```

// Core HStoreHaus components
pub use crate::core::HStoreHaus;
pub use crate::errors::HStoreHausError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, HStoreConfig};

// Re-export commonly used store-object types for convenience
pub use store_object::prelude::*;

// Re-export store_object module
pub use store_object;

// Common external dependencies
pub use async_trait;
pub use sqlx;
pub use tokio;

// Commonly used sqlx types
pub use sqlx::{FromRow, PgPool, Row};
