//! Unified value model and type mapping between Rust field types and SQL columns
//! This crate provides the conversion logic used across the rowhaus ecosystem

pub mod conversion;
pub mod custom;
pub mod serialize;
pub mod sql;
pub mod types;

// Re-export commonly used items
pub use conversion::{ConversionError, FieldType};
pub use custom::{CustomField, CustomKind, CustomValue};
pub use serialize::{marshal, Json};
pub use sql::{kind_to_sql_type, FieldKind};
pub use types::{ColumnDescriptor, SqlValue, Value};

// Re-export external crates whose types appear in the public API
pub use chrono;
pub use serde_json;
pub use uuid;
