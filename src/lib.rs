//! # RowHaus
//!
//! A metadata-driven entity-relational mapper for SQLite: table schemas are
//! derived from annotated structs, and records round-trip to rows through
//! generated, parameterized SQL.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rowhaus::prelude::*;
//!
//! #[model]
//! #[entity(schema = "test")]
//! pub struct Test {
//!     #[primary_key]
//!     pub id: Option<i64>,
//!
//!     pub value: String,
//!
//!     #[sql_default("bar")]
//!     pub has_default: String,
//! }
//!
//! fn main() -> Result<(), RowHausError> {
//!     let rowhaus = RowHaus::in_memory()?;
//!     rowhaus.auto_migrate::<Test>(true)?;
//!
//!     let tests = rowhaus.repository::<Test>();
//!
//!     // `has_default` is left to the store's DEFAULT clause
//!     let record = Test::create_record([("value", "foo")])?;
//!     let created = tests.add_record(record)?;
//!     assert_eq!(created.has_default, "bar");
//!
//!     let fetched = tests.get(created.id)?;
//!     println!("Fetched: {:?}", fetched);
//!
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod migration;
pub mod prelude;
pub mod sqlite;

// Re-export the main public types for convenience
pub use crate::core::RowHaus;
pub use errors::RowHausError;
pub use sqlite::SqliteDriver;

// Re-export centralized config
pub use config::{AppConfig, ConfigError, DatabaseConfig};

// Re-export internal crates used by macros and public API
// These MUST be public for the generated macro code to work correctly
pub use store_object;
pub use table_derive;
pub use type_mapping;

pub use store_object::{Entity, MapperError, Record, Repository};
pub use table_derive::{model, Entity};

// Re-export external dependencies used in public API
pub use rusqlite;
