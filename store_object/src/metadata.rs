//! Entity metadata
//!
//! Field descriptors and schema-level facts for a record type. Metadata is
//! built once per type (the derive macro caches it in a `OnceLock`) and is
//! immutable afterwards.

use crate::errors::MapperError;
use crate::naming::{to_camel_case, to_snake_case};
use crate::validation::validate_identifier;
use type_mapping::{FieldKind, SqlValue};

/// Symbolic value rendered as a literal SQL expression instead of a bound parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedConstant {
    CurrentTimestamp,
}

impl NamedConstant {
    /// SQL expression for the constant
    pub fn as_sql(&self) -> &'static str {
        match self {
            NamedConstant::CurrentTimestamp => "datetime('now')",
        }
    }
}

/// Argument of a `sql_default` or `sql_on_update` marker
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerValue {
    Constant(NamedConstant),
    Literal(SqlValue),
}

impl From<NamedConstant> for MarkerValue {
    fn from(constant: NamedConstant) -> Self {
        MarkerValue::Constant(constant)
    }
}

impl MarkerValue {
    pub fn literal(value: impl Into<SqlValue>) -> Self {
        MarkerValue::Literal(value.into())
    }
}

/// Constraint marker attached to a field
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    PrimaryKey,
    AutoIncrement,
    Unique,
    Indexed,
    SqlType(String),
    SqlDefault(MarkerValue),
    SqlOnUpdate(MarkerValue),
}

/// Descriptor of one declared field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMetadata {
    name: String,
    column: String,
    kind: FieldKind,
    nullable: bool,
    constraints: Vec<Constraint>,
    position: usize,
}

impl FieldMetadata {
    pub fn new(name: impl Into<String>, kind: FieldKind, nullable: bool) -> Self {
        let name = name.into();
        let column = to_snake_case(&name);
        Self {
            name,
            column,
            kind,
            nullable,
            constraints: Vec::new(),
            position: 0,
        }
    }

    /// Attach a marker; markers keep their declaration order
    pub fn with(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Field-space identifier
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column name in the store
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Declaration order index
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_primary_key(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c, Constraint::PrimaryKey))
    }

    pub fn has_sql_default(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c, Constraint::SqlDefault(_)))
    }

    /// First `sql_on_update` marker, if any
    pub fn on_update(&self) -> Option<&MarkerValue> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::SqlOnUpdate(value) => Some(value),
            _ => None,
        })
    }
}

/// Schema-level facts and ordered field descriptors of a record type
#[derive(Debug, Clone, PartialEq)]
pub struct EntityMetadata {
    type_name: String,
    schema_override: Option<String>,
    fields: Vec<FieldMetadata>,
}

impl EntityMetadata {
    /// Start metadata for a type; `type_name` may be a full path
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            schema_override: None,
            fields: Vec::new(),
        }
    }

    /// Explicit schema name, overriding the one derived from the type name
    pub fn with_schema_name(mut self, schema_name: impl Into<String>) -> Self {
        self.schema_override = Some(schema_name.into());
        self
    }

    /// Append a field; its position is its declaration index
    pub fn field(mut self, mut field: FieldMetadata) -> Self {
        field.position = self.fields.len();
        self.fields.push(field);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Short type name, without any module path
    pub fn short_name(&self) -> &str {
        self.type_name
            .rsplit("::")
            .next()
            .unwrap_or(&self.type_name)
    }

    /// Explicit override if declared, else snake_case of the short type name
    pub fn schema_name(&self) -> String {
        match &self.schema_override {
            Some(name) => name.clone(),
            None => to_snake_case(self.short_name()),
        }
    }

    /// Declared fields in source order
    pub fn fields(&self) -> &[FieldMetadata] {
        &self.fields
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldMetadata> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The field carrying the primary key marker.
    ///
    /// Fails with a schema error when no field, or more than one, is marked.
    pub fn primary_key_field(&self) -> Result<&FieldMetadata, MapperError> {
        let mut keys = self.fields.iter().filter(|f| f.is_primary_key());
        let first = keys.next().ok_or_else(|| {
            MapperError::schema(self.short_name(), "Entity does not have a primary key")
        })?;

        if let Some(second) = keys.next() {
            return Err(MapperError::schema(
                self.short_name(),
                format!(
                    "Entity has more than one primary key ('{}' and '{}')",
                    first.name, second.name
                ),
            ));
        }

        Ok(first)
    }

    /// Resolve a column reported by the store to a declared field.
    ///
    /// Matches the field's column name first, then the field named by the
    /// camelCase translation of the column.
    pub fn resolve_column(&self, column: &str) -> Option<&FieldMetadata> {
        self.fields
            .iter()
            .find(|f| f.column == column)
            .or_else(|| {
                let field_name = to_camel_case(column);
                self.find_field(&field_name)
            })
    }

    /// Check the schema name, every column name, and the primary key
    pub fn validate(&self) -> Result<(), MapperError> {
        let schema_name = self.schema_name();
        validate_identifier(&schema_name)
            .map_err(|e| MapperError::schema(self.short_name(), e.to_string()))?;

        for field in &self.fields {
            validate_identifier(&field.column)
                .map_err(|e| MapperError::schema(self.short_name(), e.to_string()))?;
        }

        self.primary_key_field()?;
        Ok(())
    }
}
