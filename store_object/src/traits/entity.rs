//! Record type trait
//!
//! Implemented by `#[derive(Entity)]`. The derive builds the metadata once,
//! caches it in a `OnceLock`, and moves typed fields in and out of records
//! with the helpers below.

use crate::errors::MapperError;
use crate::metadata::EntityMetadata;
use crate::record::Record;
use type_mapping::{FieldType, Value};

/// A record type with per-type metadata
///
/// Recommended usage:
/// ```ignore
/// use rowhaus::prelude::*;
///
/// #[model]
/// #[entity(schema = "articles")]
/// pub struct Article {
///     #[primary_key]
///     #[auto_increment]
///     pub id: Option<i64>,
///
///     #[indexed]
///     pub title: String,
///
///     #[sql_default(CurrentTimestamp)]
///     #[sql_on_update(CurrentTimestamp)]
///     pub updated_at: DateTime<Utc>,
/// }
/// ```
pub trait Entity: Sized {
    /// Metadata descriptor for the type, built once
    fn metadata() -> &'static EntityMetadata;

    /// Convert the instance into a record. A primary key that holds no
    /// value is left uninitialized.
    fn to_record(&self) -> Result<Record, MapperError>;

    /// Build an instance from a fully initialized record
    fn from_record(record: Record) -> Result<Self, MapperError>;

    /// Build and validate a record from explicit field values
    fn create_record<I, K, V>(args: I) -> Result<Record, MapperError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Record::create(Self::metadata(), args)
    }

    /// Current primary key value, `None` when it is unset or NULL
    fn primary_key(&self) -> Result<Option<Value>, MapperError> {
        let field = Self::metadata().primary_key_field()?;
        let mut record = self.to_record()?;
        Ok(record.take(field.name()).filter(|value| !value.is_null()))
    }
}

/// Store a typed field into a record
pub fn put_field<F: FieldType>(record: &mut Record, name: &str, value: &F) -> Result<(), MapperError> {
    let value = value
        .to_value()
        .map_err(|e| MapperError::validation(name, e.to_string()))?;
    record.set(name, value);
    Ok(())
}

/// Store a primary key field; a NULL key leaves the field uninitialized
pub fn put_key<F: FieldType>(record: &mut Record, name: &str, value: &F) -> Result<(), MapperError> {
    let value = value
        .to_value()
        .map_err(|e| MapperError::validation(name, e.to_string()))?;
    if !value.is_null() {
        record.set(name, value);
    }
    Ok(())
}

/// Take a typed field out of a record
pub fn take_field<F: FieldType>(record: &mut Record, name: &str) -> Result<F, MapperError> {
    let value = record
        .take(name)
        .ok_or_else(|| MapperError::uninitialized(name))?;
    F::from_value(value).map_err(|e| MapperError::validation(name, e.to_string()))
}
