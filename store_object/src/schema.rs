//! DDL generation
//!
//! Turns entity metadata into an ordered list of statements: one CREATE
//! TABLE followed by one CREATE INDEX per indexed field.

use crate::errors::MapperError;
use crate::metadata::{Constraint, EntityMetadata, FieldMetadata, MarkerValue};
use crate::validation::quote_identifier;
use type_mapping::kind_to_sql_type;

pub struct SchemaGenerator;

impl SchemaGenerator {
    /// Generate the CREATE TABLE statement and the CREATE INDEX statements,
    /// in field declaration order.
    ///
    /// `quote_literal` is the driver's literal quoting, applied to plain
    /// default values.
    pub fn create_statements<Q>(
        metadata: &EntityMetadata,
        quote_literal: Q,
    ) -> Result<Vec<String>, MapperError>
    where
        Q: Fn(&str) -> String,
    {
        metadata.validate()?;

        let schema_name = quote_identifier(&metadata.schema_name());
        let mut columns = Vec::with_capacity(metadata.fields().len());
        let mut indexes = Vec::new();

        for field in metadata.fields() {
            columns.push(Self::column_definition(metadata, field, &quote_literal)?);

            for constraint in field.constraints() {
                if matches!(constraint, Constraint::Indexed) {
                    let index_name = quote_identifier(&format!("idx_{}", field.column()));
                    indexes.push(format!(
                        "CREATE INDEX {} ON {}({})",
                        index_name,
                        schema_name,
                        quote_identifier(field.column())
                    ));
                }
            }
        }

        let mut statements = Vec::with_capacity(indexes.len() + 1);
        statements.push(format!(
            "CREATE TABLE {} ({})",
            schema_name,
            columns.join(", ")
        ));
        statements.extend(indexes);

        for statement in &statements {
            tracing::debug!(schema = %metadata.schema_name(), %statement, "generated DDL");
        }

        Ok(statements)
    }

    /// DROP TABLE statement for the entity's schema
    pub fn drop_statement(metadata: &EntityMetadata) -> String {
        format!(
            "DROP TABLE IF EXISTS {}",
            quote_identifier(&metadata.schema_name())
        )
    }

    /// Column definition: quoted name, column type, then constraint clauses.
    /// `NOT NULL` comes first; marker clauses follow in declaration order.
    fn column_definition<Q>(
        metadata: &EntityMetadata,
        field: &FieldMetadata,
        quote_literal: &Q,
    ) -> Result<String, MapperError>
    where
        Q: Fn(&str) -> String,
    {
        let mut column_type = kind_to_sql_type(field.kind()).map(str::to_string);
        let mut clauses: Vec<String> = Vec::new();

        if !field.is_nullable() {
            clauses.push("NOT NULL".to_string());
        }

        for constraint in field.constraints() {
            match constraint {
                Constraint::SqlType(sql_type) => column_type = Some(sql_type.clone()),
                Constraint::SqlDefault(default) => {
                    clauses.push(format!("DEFAULT ({})", render_default(default, quote_literal)))
                }
                Constraint::PrimaryKey => clauses.push("PRIMARY KEY".to_string()),
                Constraint::AutoIncrement => clauses.push("AUTOINCREMENT".to_string()),
                Constraint::Unique => clauses.push("UNIQUE".to_string()),
                Constraint::Indexed | Constraint::SqlOnUpdate(_) => {}
            }
        }

        let column_type = column_type.ok_or_else(|| {
            MapperError::schema(
                metadata.short_name(),
                format!(
                    "Unable to derive a column type for field '{}' of kind '{}'; add an explicit sql_type",
                    field.name(),
                    field.kind().name()
                ),
            )
        })?;

        let mut definition = format!("{} {}", quote_identifier(field.column()), column_type);
        if !clauses.is_empty() {
            definition.push(' ');
            definition.push_str(&clauses.join(" "));
        }
        Ok(definition)
    }
}

fn render_default<Q>(default: &MarkerValue, quote_literal: &Q) -> String
where
    Q: Fn(&str) -> String,
{
    match default {
        MarkerValue::Constant(constant) => constant.as_sql().to_string(),
        MarkerValue::Literal(value) => match value.literal_text() {
            Some(text) => quote_literal(&text),
            None => "NULL".to_string(),
        },
    }
}
