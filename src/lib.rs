//! # HStoreHaus
//!
//! PostgreSQL hstore columns as a native field type: nested key lookups with
//! integer and date casts, containment queries, dictionary values and
//! references to other records stored inside the key-value blob.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hstorehaus::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::new(
//!         "localhost".to_string(), 5432, "hstorehaus".to_string(),
//!         "postgres".to_string(), "password".to_string(),
//!         1, 5, 30, 600, 3600,
//!     );
//!
//!     let mut haus = HStoreHaus::new(config).await?;
//!     haus.register_manager(haus.manager("items")?)?;
//!     let items = haus.get_manager("items")?;
//!
//!     // Rows whose `data` has an integer `size` of at least 10
//!     let query = QueryBuilder::new().hstore("data__size__asint__gte", 10)?;
//!     println!("{} large items", items.count(&query).await?);
//!
//!     // Keys and values of the first match
//!     let keys = items.hkeys("data", &query).await?;
//!     let color = items.hpeek("data", "color", &query).await?;
//!     println!("{:?} {:?}", keys, color);
//!
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use crate::core::HStoreHaus;
pub use errors::HStoreHausError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, HStoreConfig};

// Re-export internal crates used by the public API
pub use store_object;
pub use store_object::{debug_log, trace_log};
pub use type_mapping;

// Re-export external dependencies used in public API
pub use async_trait;
pub use sqlx;
