//! Custom field types
//!
//! A `custom<T>` field holds a value of an application-defined type. The type
//! supplies its own construction from a raw column value and renders back to
//! the store through its `Display` form.

use crate::types::{ColumnDescriptor, SqlValue};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Construction capability for application-defined field types
///
/// Implement this trait and register the type with [`custom_field!`](crate::custom_field)
/// to use it as a record field:
///
/// ```rust
/// use std::fmt;
/// use type_mapping::{custom_field, ColumnDescriptor, CustomField, SqlValue};
///
/// #[derive(Debug, Clone, PartialEq)]
/// pub struct Email(String);
///
/// impl fmt::Display for Email {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         f.write_str(&self.0)
///     }
/// }
///
/// impl CustomField for Email {
///     fn from_column(raw: SqlValue, _column: &ColumnDescriptor) -> Result<Self, String> {
///         match raw {
///             SqlValue::Text(s) if s.contains('@') => Ok(Email(s)),
///             other => Err(format!("not an email address: {:?}", other)),
///         }
///     }
/// }
///
/// custom_field!(Email);
/// ```
pub trait CustomField: fmt::Debug + fmt::Display + Clone + Send + Sync + 'static {
    /// Column type used in DDL when the field carries no explicit `sql_type`
    const SQL_TYPE: Option<&'static str> = None;

    /// Build a value from the raw column cell and its descriptor
    fn from_column(raw: SqlValue, column: &ColumnDescriptor) -> Result<Self, String>;
}

/// Object-safe view of a custom value
pub trait CustomObject: fmt::Debug + fmt::Display + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T: CustomField> CustomObject for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Shared, type-erased custom value stored in a record
#[derive(Clone)]
pub struct CustomValue(Arc<dyn CustomObject>);

impl CustomValue {
    pub fn new<T: CustomField>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

// Two custom values are equal when they have the same type and render the same.
impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name() && self.to_string() == other.to_string()
    }
}

/// Descriptor of a custom field type carried in field metadata
#[derive(Clone, Copy)]
pub struct CustomKind {
    pub type_name: &'static str,
    pub sql_type: Option<&'static str>,
    construct: fn(SqlValue, &ColumnDescriptor) -> Result<CustomValue, String>,
}

impl CustomKind {
    pub fn of<T: CustomField>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            sql_type: T::SQL_TYPE,
            construct: construct_custom::<T>,
        }
    }

    /// Run the type's construction capability
    pub fn construct(
        &self,
        raw: SqlValue,
        column: &ColumnDescriptor,
    ) -> Result<CustomValue, String> {
        (self.construct)(raw, column)
    }
}

fn construct_custom<T: CustomField>(
    raw: SqlValue,
    column: &ColumnDescriptor,
) -> Result<CustomValue, String> {
    T::from_column(raw, column).map(CustomValue::new)
}

impl fmt::Debug for CustomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomKind")
            .field("type_name", &self.type_name)
            .field("sql_type", &self.sql_type)
            .finish()
    }
}

impl PartialEq for CustomKind {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name && self.sql_type == other.sql_type
    }
}

impl Eq for CustomKind {}

/// Register a [`CustomField`] type as a record field type
#[macro_export]
macro_rules! custom_field {
    ($ty:ty) => {
        impl $crate::FieldType for $ty {
            fn kind() -> $crate::FieldKind {
                $crate::FieldKind::Custom($crate::CustomKind::of::<$ty>())
            }

            fn to_value(&self) -> ::std::result::Result<$crate::Value, $crate::ConversionError> {
                Ok($crate::Value::Custom($crate::CustomValue::new(
                    ::std::clone::Clone::clone(self),
                )))
            }

            fn from_value(
                value: $crate::Value,
            ) -> ::std::result::Result<Self, $crate::ConversionError> {
                match value {
                    $crate::Value::Custom(custom) => custom
                        .downcast_ref::<$ty>()
                        .cloned()
                        .ok_or_else(|| $crate::ConversionError::TypeMismatch {
                            expected: ::std::any::type_name::<$ty>(),
                            found: custom.type_name(),
                        }),
                    other => Err($crate::ConversionError::TypeMismatch {
                        expected: ::std::any::type_name::<$ty>(),
                        found: other.type_name(),
                    }),
                }
            }
        }
    };
}

impl CustomField for uuid::Uuid {
    const SQL_TYPE: Option<&'static str> = Some("uuid");

    fn from_column(raw: SqlValue, _column: &ColumnDescriptor) -> Result<Self, String> {
        match raw {
            SqlValue::Text(s) => uuid::Uuid::parse_str(&s).map_err(|e| e.to_string()),
            SqlValue::Blob(bytes) => uuid::Uuid::from_slice(&bytes).map_err(|e| e.to_string()),
            other => Err(format!("cannot build a UUID from {}", other.type_name())),
        }
    }
}

custom_field!(uuid::Uuid);
