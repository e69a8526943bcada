//! Core RowHaus functionality
//!
//! This module contains the main RowHaus struct, which owns the store
//! connection and hands out repositories bound to it.

use crate::errors::RowHausError;
use crate::sqlite::SqliteDriver;
use config::{AppConfig, DatabaseConfig};
use store_object::{Entity, Repository, StoreDriver};

/// Main RowHaus coordinator that owns the database connection
#[derive(Debug)]
pub struct RowHaus {
    driver: SqliteDriver,
}

impl RowHaus {
    /// Open the database described by `config`
    pub fn new(config: DatabaseConfig) -> Result<Self, RowHausError> {
        config.validate()?;
        let driver = SqliteDriver::open(&config)?;
        tracing::info!(path = %config.path, "RowHaus connected");
        Ok(Self { driver })
    }

    /// Load configuration (see `AppConfig::load`) and open the database
    pub fn from_env() -> Result<Self, RowHausError> {
        let config = AppConfig::load()?;
        Self::new(config.database)
    }

    /// Private in-memory database
    pub fn in_memory() -> Result<Self, RowHausError> {
        Self::new(DatabaseConfig::in_memory())
    }

    /// Get the store driver
    pub fn driver(&self) -> &SqliteDriver {
        &self.driver
    }

    /// Repository for `T` bound to this connection
    pub fn repository<T: Entity>(&self) -> Repository<T, &SqliteDriver> {
        Repository::new(&self.driver)
    }

    /// Check database connection health
    pub fn health_check(&self) -> Result<(), RowHausError> {
        self.driver
            .query("SELECT 1", &[])
            .map_err(store_object::MapperError::from)?;
        Ok(())
    }
}
