//! Convenience re-exports for common RowHaus usage
//!
//! This prelude module re-exports the most commonly used items from the RowHaus ecosystem,
//! making it easier to import everything you need with a single use statement.
//!
//! # Example
//!
//! ```rust
//! use rowhaus::prelude::*;
//!
//! // Now you have access to all the common RowHaus types and traits
//! ```

// Core RowHaus components
pub use crate::core::RowHaus;
pub use crate::errors::RowHausError;
pub use crate::sqlite::SqliteDriver;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig};

// Re-export commonly used store-object types for convenience
pub use store_object::prelude::*;

// Re-export table derive for model creation
pub use table_derive::{model, Entity};

// Custom field support
pub use type_mapping::{custom_field, ColumnDescriptor, CustomField, CustomValue};

// Common external dependencies
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use serde_json::json;
pub use type_mapping::uuid::Uuid;
