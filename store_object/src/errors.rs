use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Failure raised by the mapping core
///
/// Every error aborts the current operation; nothing is retried here.
#[derive(Error, Debug)]
pub enum MapperError {
    /// Missing or ambiguous primary key, or a column type that cannot be derived
    #[error("Schema error in '{entity}': {message}")]
    Schema { entity: String, message: String },

    /// Required field left uninitialized, or NULL assigned to a non-nullable field
    #[error("Validation error on field '{field}': {message}")]
    Validation { field: String, message: String },

    /// Malformed structured or datetime payload during hydration
    #[error("Decode error on field '{field}': {message}")]
    Decode { field: String, message: String },

    /// Primary-key lookup returned no row
    #[error("Not found: no row in '{schema}' with primary key {key}")]
    NotFound { schema: String, key: String },

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
}

impl MapperError {
    pub fn schema(entity: &str, message: impl Into<String>) -> Self {
        MapperError::Schema {
            entity: entity.to_string(),
            message: message.into(),
        }
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        MapperError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn uninitialized(field: &str) -> Self {
        Self::validation(field, format!("Property '{}' not initialized", field))
    }

    pub fn not_nullable(field: &str) -> Self {
        Self::validation(field, format!("Property '{}' is not nullable", field))
    }

    pub fn decode(field: &str, message: impl Into<String>) -> Self {
        MapperError::Decode {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(schema: &str, key: impl fmt::Debug) -> Self {
        MapperError::NotFound {
            schema: schema.to_string(),
            key: format!("{:?}", key),
        }
    }

    /// Name of the field this error is about, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            MapperError::Validation { field, .. } | MapperError::Decode { field, .. } => {
                Some(field)
            }
            _ => None,
        }
    }
}

/// Opaque failure surfaced from the store driver
#[derive(Debug)]
pub struct DriverError {
    operation: &'static str,
    source: Box<dyn StdError + Send + Sync>,
}

impl DriverError {
    pub fn new(operation: &'static str, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            operation,
            source: source.into(),
        }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.operation, self.source)
    }
}

impl StdError for DriverError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.source)
    }
}
