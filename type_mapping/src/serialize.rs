//! Serialization utilities
//!
//! This module converts typed record values into the raw values bound as
//! statement parameters, and provides the `Json<T>` wrapper for typed
//! structured fields.

use crate::conversion::{ConversionError, FieldType};
use crate::sql::FieldKind;
use crate::types::{SqlValue, Value};
use chrono::SecondsFormat;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

/// Marshal a record value into a bindable store value.
///
/// Datetimes render as ISO-8601 strings, structured values as their JSON
/// encoding, custom values through `Display`; everything else passes through.
pub fn marshal(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Real(f) => SqlValue::Real(*f),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Boolean(b) => SqlValue::Boolean(*b),
        Value::DateTime(dt) => SqlValue::Text(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
        Value::Structured(json) => SqlValue::Text(json.to_string()),
        Value::Custom(custom) => SqlValue::Text(custom.to_string()),
    }
}

/// Typed structured field, stored as JSON
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use type_mapping::Json;
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct Settings {
///     retries: u32,
/// }
///
/// let settings = Json(Settings { retries: 3 });
/// assert_eq!(settings.retries, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> FieldType for Json<T>
where
    T: Serialize + DeserializeOwned,
{
    fn kind() -> FieldKind {
        FieldKind::Structured
    }

    fn to_value(&self) -> Result<Value, ConversionError> {
        serde_json::to_value(&self.0)
            .map(Value::Structured)
            .map_err(|e| ConversionError::Json(e.to_string()))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Structured(json) => serde_json::from_value(json)
                .map(Json)
                .map_err(|e| ConversionError::Json(e.to_string())),
            other => Err(ConversionError::mismatch("structured", &other)),
        }
    }
}
