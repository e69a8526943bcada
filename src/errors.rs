//! Error types for the RowHaus crate
//!
//! This module contains all error types that can be returned by RowHaus operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RowHausError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] rusqlite::Error),

    #[error(transparent)]
    Mapper(#[from] store_object::MapperError),
}

impl RowHausError {
    /// The mapping error, if this is one
    pub fn as_mapper(&self) -> Option<&store_object::MapperError> {
        match self {
            RowHausError::Mapper(e) => Some(e),
            _ => None,
        }
    }
}
