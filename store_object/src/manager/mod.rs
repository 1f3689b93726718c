//! HStore manager
//!
//! Table-bound operations on hstore columns: reading keys and values,
//! removing and merging keys, and running lookups.

pub mod core;
pub mod provider;
pub mod queries;
pub mod statements;

pub use self::core::HStoreManager;
pub use provider::PgRecordProvider;
pub use statements::{HStoreStatements, Statement};
