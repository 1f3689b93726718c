//! Type mapping between Rust values and PostgreSQL hstore storage
//! This crate provides the value type and text preparation used across the hstorehaus ecosystem

pub mod serialize;
pub mod types;

pub use serialize::{
    mapping_to_hstore, record_to_hstore, sequence_to_text_array, serialize_to_hstore_payload,
    to_hstore_text, HStoreConversionError, HSTORE_DATE_FORMAT,
};
pub use types::PostgresValue;
