//! Conversion between Rust field types and record values
//!
//! `FieldType` is implemented for every Rust type that can back a record
//! field. The derive macro uses it to learn a field's kind and nullability
//! and to move values in and out of records.

use crate::sql::FieldKind;
use crate::types::Value;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("value {value} is out of range for {target}")]
    OutOfRange { value: i64, target: &'static str },

    #[error("JSON conversion failed: {0}")]
    Json(String),
}

impl ConversionError {
    pub fn mismatch(expected: &'static str, found: &Value) -> Self {
        ConversionError::TypeMismatch {
            expected,
            found: found.type_name(),
        }
    }
}

/// A Rust type usable as a record field
pub trait FieldType: Sized {
    /// Whether the column accepts NULL
    const NULLABLE: bool = false;

    /// Declared kind of the field
    fn kind() -> FieldKind;

    /// Convert the field into a record value
    fn to_value(&self) -> Result<Value, ConversionError>;

    /// Take the field back out of a record value
    fn from_value(value: Value) -> Result<Self, ConversionError>;
}

impl FieldType for i64 {
    fn kind() -> FieldKind {
        FieldKind::Integer
    }

    fn to_value(&self) -> Result<Value, ConversionError> {
        Ok(Value::Integer(*self))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Integer(i) => Ok(i),
            other => Err(ConversionError::mismatch("integer", &other)),
        }
    }
}

impl FieldType for i32 {
    fn kind() -> FieldKind {
        FieldKind::Integer
    }

    fn to_value(&self) -> Result<Value, ConversionError> {
        Ok(Value::Integer(i64::from(*self)))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Integer(i) => i32::try_from(i).map_err(|_| ConversionError::OutOfRange {
                value: i,
                target: "i32",
            }),
            other => Err(ConversionError::mismatch("integer", &other)),
        }
    }
}

impl FieldType for f64 {
    fn kind() -> FieldKind {
        FieldKind::Real
    }

    fn to_value(&self) -> Result<Value, ConversionError> {
        Ok(Value::Real(*self))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Real(f) => Ok(f),
            Value::Integer(i) => Ok(i as f64),
            other => Err(ConversionError::mismatch("real", &other)),
        }
    }
}

impl FieldType for String {
    fn kind() -> FieldKind {
        FieldKind::Text
    }

    fn to_value(&self) -> Result<Value, ConversionError> {
        Ok(Value::Text(self.clone()))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(ConversionError::mismatch("text", &other)),
        }
    }
}

impl FieldType for bool {
    fn kind() -> FieldKind {
        FieldKind::Boolean
    }

    fn to_value(&self) -> Result<Value, ConversionError> {
        Ok(Value::Boolean(*self))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Boolean(b) => Ok(b),
            other => Err(ConversionError::mismatch("boolean", &other)),
        }
    }
}

impl FieldType for DateTime<Utc> {
    fn kind() -> FieldKind {
        FieldKind::DateTime
    }

    fn to_value(&self) -> Result<Value, ConversionError> {
        Ok(Value::DateTime(*self))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            other => Err(ConversionError::mismatch("datetime", &other)),
        }
    }
}

impl FieldType for serde_json::Value {
    fn kind() -> FieldKind {
        FieldKind::Structured
    }

    fn to_value(&self) -> Result<Value, ConversionError> {
        Ok(Value::Structured(self.clone()))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Structured(v) => Ok(v),
            other => Err(ConversionError::mismatch("structured", &other)),
        }
    }
}

impl<T: FieldType> FieldType for Option<T> {
    const NULLABLE: bool = true;

    fn kind() -> FieldKind {
        T::kind()
    }

    fn to_value(&self) -> Result<Value, ConversionError> {
        match self {
            Some(v) => v.to_value(),
            None => Ok(Value::Null),
        }
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
