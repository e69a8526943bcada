//! DML generation
//!
//! Builds parameterized single-table statements with positional `?`
//! placeholders and their ordered parameter lists.

use crate::errors::MapperError;
use crate::metadata::{EntityMetadata, MarkerValue};
use crate::record::Record;
use crate::validation::quote_identifier;
use type_mapping::{marshal, SqlValue, Value};

/// SQL text plus its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    pub fn new(sql: String, params: Vec<SqlValue>) -> Self {
        Self { sql, params }
    }
}

pub struct StatementBuilder;

impl StatementBuilder {
    /// INSERT of every initialized field. Uninitialized fields are left out
    /// so the store applies its own defaults and constraints.
    pub fn insert(metadata: &EntityMetadata, record: &Record) -> Result<Statement, MapperError> {
        let schema_name = quote_identifier(&metadata.schema_name());
        let mut columns = Vec::new();
        let mut params = Vec::new();

        for field in metadata.fields() {
            if let Some(value) = record.get(field.name()) {
                columns.push(quote_identifier(field.column()));
                params.push(marshal(value));
            }
        }

        let sql = if columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", schema_name)
        } else {
            let placeholders = vec!["?"; params.len()].join(", ");
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                schema_name,
                columns.join(", "),
                placeholders
            )
        };

        tracing::trace!(%sql, params = params.len(), "built insert");
        Ok(Statement::new(sql, params))
    }

    /// UPDATE of every non-key field, keyed on the record's primary key.
    ///
    /// A field with a `sql_on_update` constant gets that SQL expression
    /// inline; one with a plain `sql_on_update` value binds that value
    /// instead of the record's. The primary key is the last parameter.
    pub fn update(metadata: &EntityMetadata, record: &Record) -> Result<Statement, MapperError> {
        let primary_key = metadata.primary_key_field()?;
        let key_value = record
            .get(primary_key.name())
            .filter(|value| !value.is_null())
            .ok_or_else(|| MapperError::uninitialized(primary_key.name()))?;

        let mut assignments = Vec::new();
        let mut params = Vec::new();

        for field in metadata.fields() {
            if field.is_primary_key() {
                continue;
            }

            let column = quote_identifier(field.column());
            match field.on_update() {
                Some(MarkerValue::Constant(constant)) => {
                    assignments.push(format!("{} = {}", column, constant.as_sql()));
                }
                Some(MarkerValue::Literal(value)) => {
                    assignments.push(format!("{} = ?", column));
                    params.push(value.clone());
                }
                None => {
                    let value = record
                        .get(field.name())
                        .ok_or_else(|| MapperError::uninitialized(field.name()))?;
                    assignments.push(format!("{} = ?", column));
                    params.push(marshal(value));
                }
            }
        }

        if assignments.is_empty() {
            return Err(MapperError::schema(
                metadata.short_name(),
                "Entity has no columns besides its primary key to update",
            ));
        }

        params.push(marshal(key_value));
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            quote_identifier(&metadata.schema_name()),
            assignments.join(", "),
            quote_identifier(primary_key.column())
        );

        tracing::trace!(%sql, params = params.len(), "built update");
        Ok(Statement::new(sql, params))
    }

    pub fn delete(metadata: &EntityMetadata, key: &Value) -> Result<Statement, MapperError> {
        let primary_key = metadata.primary_key_field()?;
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?",
            quote_identifier(&metadata.schema_name()),
            quote_identifier(primary_key.column())
        );
        Ok(Statement::new(sql, vec![marshal(key)]))
    }

    pub fn select_by_primary_key(
        metadata: &EntityMetadata,
        key: &Value,
    ) -> Result<Statement, MapperError> {
        let primary_key = metadata.primary_key_field()?;
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?",
            quote_identifier(&metadata.schema_name()),
            quote_identifier(primary_key.column())
        );
        Ok(Statement::new(sql, vec![marshal(key)]))
    }

    pub fn select_all(metadata: &EntityMetadata) -> Statement {
        let sql = format!("SELECT * FROM {}", quote_identifier(&metadata.schema_name()));
        Statement::new(sql, Vec::new())
    }
}
