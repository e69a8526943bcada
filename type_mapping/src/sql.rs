//! SQL type mapping
//!
//! This module maps declared field kinds to the column types used in DDL.

use crate::custom::CustomKind;

/// Declared type kind of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Real,
    Text,
    Boolean,
    DateTime,
    /// Array or mapping stored as JSON
    Structured,
    Custom(CustomKind),
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Integer => "integer",
            FieldKind::Real => "real",
            FieldKind::Text => "text",
            FieldKind::Boolean => "boolean",
            FieldKind::DateTime => "datetime",
            FieldKind::Structured => "structured",
            FieldKind::Custom(kind) => kind.type_name,
        }
    }
}

/// Map a field kind to its column type for DDL generation.
/// Returns `None` when the kind has no derivable column type.
pub fn kind_to_sql_type(kind: &FieldKind) -> Option<&'static str> {
    match kind {
        FieldKind::Integer => Some("integer"),
        FieldKind::Text => Some("string"),
        FieldKind::DateTime => Some("datetime"),
        FieldKind::Structured => Some("json"),
        FieldKind::Real => Some("real"),
        FieldKind::Boolean => Some("boolean"),
        FieldKind::Custom(custom) => custom.sql_type,
    }
}
