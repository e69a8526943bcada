//! Value definitions
//!
//! This module provides the raw values exchanged with a store driver, the
//! typed values held by records, and the column descriptor reported for
//! every result row.

use crate::custom::CustomValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw store value: a bound statement parameter or a result cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Boolean(bool),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Storage class name, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Integer(_) => "integer",
            SqlValue::Real(_) => "real",
            SqlValue::Text(_) => "text",
            SqlValue::Blob(_) => "blob",
            SqlValue::Boolean(_) => "boolean",
        }
    }

    /// String form handed to the driver when this value has to appear as a
    /// quoted SQL literal. `None` for NULL, which is never quoted.
    pub fn literal_text(&self) -> Option<String> {
        match self {
            SqlValue::Null => None,
            SqlValue::Integer(i) => Some(i.to_string()),
            SqlValue::Real(f) => Some(f.to_string()),
            SqlValue::Text(s) => Some(s.clone()),
            SqlValue::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
            SqlValue::Boolean(b) => Some(if *b { "1" } else { "0" }.to_string()),
        }
    }
}

impl From<String> for SqlValue {
    fn from(val: String) -> Self {
        SqlValue::Text(val)
    }
}

impl From<&str> for SqlValue {
    fn from(val: &str) -> Self {
        SqlValue::Text(val.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(val: i64) -> Self {
        SqlValue::Integer(val)
    }
}

impl From<i32> for SqlValue {
    fn from(val: i32) -> Self {
        SqlValue::Integer(i64::from(val))
    }
}

impl From<f64> for SqlValue {
    fn from(val: f64) -> Self {
        SqlValue::Real(val)
    }
}

impl From<bool> for SqlValue {
    fn from(val: bool) -> Self {
        SqlValue::Boolean(val)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(val: Vec<u8>) -> Self {
        SqlValue::Blob(val)
    }
}

impl<T> From<Option<T>> for SqlValue
where
    T: Into<SqlValue>,
{
    fn from(val: Option<T>) -> Self {
        match val {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

/// Typed value of a record field
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    /// Array or mapping, kept as decoded JSON
    Structured(serde_json::Value),
    Custom(CustomValue),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Boolean(_) => "boolean",
            Value::DateTime(_) => "datetime",
            Value::Structured(_) => "structured",
            Value::Custom(_) => "custom",
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_structured(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Structured(v) => Some(v),
            _ => None,
        }
    }
}

impl From<String> for Value {
    fn from(val: String) -> Self {
        Value::Text(val)
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::Text(val.to_string())
    }
}

impl From<i64> for Value {
    fn from(val: i64) -> Self {
        Value::Integer(val)
    }
}

impl From<i32> for Value {
    fn from(val: i32) -> Self {
        Value::Integer(i64::from(val))
    }
}

impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Value::Real(val)
    }
}

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Value::Boolean(val)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(val: DateTime<Utc>) -> Self {
        Value::DateTime(val)
    }
}

impl From<serde_json::Value> for Value {
    fn from(val: serde_json::Value) -> Self {
        Value::Structured(val)
    }
}

impl From<CustomValue> for Value {
    fn from(val: CustomValue) -> Self {
        Value::Custom(val)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(val: Option<T>) -> Self {
        match val {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// Column name and declared type reported by the store for a result column.
/// Drives name translation only; typing comes from the field metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub declared_type: Option<String>,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, declared_type: Option<String>) -> Self {
        Self {
            name: name.into(),
            declared_type,
        }
    }
}
