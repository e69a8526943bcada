//! Store Object - mapping core for RowHaus
//!
//! This crate provides per-type entity metadata, DDL and DML generation,
//! row hydration and the repository that runs them against a store driver.

pub mod errors;
pub mod hydrate;
pub mod metadata;
pub mod naming;
pub mod prelude;
pub mod record;
pub mod repository;
pub mod schema;
pub mod statements;
pub mod traits;
pub mod validation;

pub use errors::{DriverError, MapperError};
pub use hydrate::{HydrationState, RowHydrator};
pub use metadata::{Constraint, EntityMetadata, FieldMetadata, MarkerValue, NamedConstant};
pub use naming::{to_camel_case, to_snake_case};
pub use record::{validate_construction, Record};
pub use repository::Repository;
pub use schema::SchemaGenerator;
pub use statements::{Statement, StatementBuilder};
pub use traits::*;
pub use validation::{quote_identifier, validate_identifier, IdentifierError};
