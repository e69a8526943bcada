//! Record instances
//!
//! A record maps field names to values. A field missing from the map is
//! *uninitialized*, which is distinct from holding `Value::Null`.

use crate::errors::MapperError;
use crate::metadata::EntityMetadata;
use std::collections::HashMap;
use type_mapping::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: HashMap<String, Value>,
}

impl Record {
    /// A record with every field uninitialized
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from explicit field values and validate it.
    ///
    /// Every field must end up initialized unless it is nullable, carries a
    /// SQL default, or is the primary key. Unknown field names are rejected.
    pub fn create<I, K, V>(metadata: &EntityMetadata, args: I) -> Result<Self, MapperError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut record = Self::new();
        for (name, value) in args {
            let name = name.into();
            if metadata.find_field(&name).is_none() {
                return Err(MapperError::validation(
                    &name,
                    format!("'{}' has no field '{}'", metadata.short_name(), name),
                ));
            }
            record.set(name, value);
        }

        validate_construction(metadata, &record)?;
        Ok(record)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Remove a field's value, leaving it uninitialized
    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn is_initialized(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Check a caller-built record: required fields must be initialized
pub fn validate_construction(metadata: &EntityMetadata, record: &Record) -> Result<(), MapperError> {
    for field in metadata.fields() {
        if !record.is_initialized(field.name())
            && !field.is_nullable()
            && !field.has_sql_default()
            && !field.is_primary_key()
        {
            return Err(MapperError::uninitialized(field.name()));
        }
    }
    Ok(())
}
