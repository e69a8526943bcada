//! Database migration functionality
//!
//! This module provides automatic table creation for entity types managed
//! by RowHaus.

use crate::core::RowHaus;
use crate::errors::RowHausError;
use store_object::{Entity, MapperError, StoreDriver};
use type_mapping::SqlValue;

impl RowHaus {
    /// Whether the table for `T` exists
    pub fn schema_exists<T: Entity>(&self) -> Result<bool, RowHausError> {
        let rows = self
            .driver()
            .query(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
                &[SqlValue::Text(T::metadata().schema_name())],
            )
            .map_err(MapperError::from)?;
        Ok(!rows.is_empty())
    }

    /// Automatically create the table and indexes for an entity.
    /// If recreate is true, drops the existing table first; otherwise an
    /// existing table is left as is.
    pub fn auto_migrate<T: Entity>(&self, recreate: bool) -> Result<(), RowHausError> {
        let repository = self.repository::<T>();
        let schema_name = T::metadata().schema_name();

        if recreate {
            crate::debug_log!(schema = %schema_name, "dropping table");
            repository.drop_schema()?;
        } else if self.schema_exists::<T>()? {
            crate::debug_log!(schema = %schema_name, "table exists, skipping migration");
            return Ok(());
        }

        repository.create_schema()?;
        tracing::info!(schema = %schema_name, recreate, "table migrated");
        Ok(())
    }
}
