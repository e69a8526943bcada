//! Convenience re-exports for common store-object usage

// Core traits
pub use crate::traits::{Entity, StoreDriver};

// Error types
pub use crate::errors::{DriverError, MapperError};

// Metadata and records
pub use crate::metadata::{Constraint, EntityMetadata, FieldMetadata, MarkerValue, NamedConstant};
pub use crate::record::Record;

// Generators and repository
pub use crate::hydrate::RowHydrator;
pub use crate::repository::Repository;
pub use crate::schema::SchemaGenerator;
pub use crate::statements::{Statement, StatementBuilder};

// Value model
pub use type_mapping::{FieldKind, FieldType, Json, SqlValue, Value};
