//! Parsing utilities for entity and field attributes
//!
//! This module handles the parsing of the `#[entity]` struct attribute and
//! the field marker attributes, and validates schema and column names.

use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::{Attribute, Data, DeriveInput, Error, Fields, Ident, Lit, LitStr, Result, Token, Type};

/// Validate a schema name and return syn::Error for better proc macro error handling
pub fn validate_schema_name_syn(name: &str, span: proc_macro2::Span) -> Result<()> {
    validate_identifier(name)
        .map_err(|e| Error::new(span, format!("Invalid schema name '{}': {}", name, e)))
}

/// Validate a column name and return syn::Error for better proc macro error handling
pub fn validate_column_name_syn(name: &str, span: proc_macro2::Span) -> Result<()> {
    validate_identifier(name)
        .map_err(|e| Error::new(span, format!("Invalid column name '{}': {}", name, e)))
}

/// Validation logic that mirrors store_object::validation
/// This keeps compile-time validation in line with runtime validation
fn validate_identifier(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("Name cannot be empty".to_string());
    }

    if name.len() > 63 {
        return Err(format!(
            "Name '{}' is too long: {} characters (max 63)",
            name,
            name.len()
        ));
    }

    let first_char = name
        .chars()
        .next()
        .ok_or_else(|| "Name cannot be empty".to_string())?;
    if !first_char.is_ascii_alphabetic() && first_char != '_' {
        return Err(format!(
            "Name '{}' must start with a letter or underscore",
            name
        ));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("Name '{}' contains invalid characters: only alphanumeric characters and underscores are allowed", name));
    }

    Ok(())
}

/// Mirrors store_object::naming::to_snake_case
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            out.push('_');
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// Argument of `#[sql_default(..)]` and `#[sql_on_update(..)]`
#[derive(Debug)]
pub enum MarkerArg {
    Constant(Ident),
    Text(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
}

const NAMED_CONSTANTS: &[&str] = &["CurrentTimestamp"];

impl Parse for MarkerArg {
    fn parse(input: ParseStream) -> Result<Self> {
        if input.peek(Token![-]) {
            input.parse::<Token![-]>()?;
            return match input.parse::<Lit>()? {
                // negate before narrowing so i64::MIN stays representable
                Lit::Int(i) => {
                    let magnitude = i.base10_parse::<i128>()?;
                    i64::try_from(-magnitude)
                        .map(MarkerArg::Integer)
                        .map_err(|_| Error::new_spanned(&i, "integer literal out of range for i64"))
                }
                Lit::Float(f) => Ok(MarkerArg::Real(-f.base10_parse::<f64>()?)),
                other => Err(Error::new_spanned(other, "only numeric literals can be negated")),
            };
        }

        if input.peek(Lit) {
            return match input.parse::<Lit>()? {
                Lit::Str(s) => Ok(MarkerArg::Text(s.value())),
                Lit::Int(i) => Ok(MarkerArg::Integer(i.base10_parse::<i64>()?)),
                Lit::Float(f) => Ok(MarkerArg::Real(f.base10_parse::<f64>()?)),
                Lit::Bool(b) => Ok(MarkerArg::Boolean(b.value)),
                other => Err(Error::new_spanned(
                    other,
                    "expected a string, integer, float or bool literal",
                )),
            };
        }

        let ident: Ident = input.parse()?;
        if NAMED_CONSTANTS.contains(&ident.to_string().as_str()) {
            Ok(MarkerArg::Constant(ident))
        } else {
            Err(Error::new(
                ident.span(),
                format!(
                    "unknown constant '{}': expected one of {}",
                    ident,
                    NAMED_CONSTANTS.join(", ")
                ),
            ))
        }
    }
}

/// Field marker, in the order it was declared
#[derive(Debug)]
pub enum Marker {
    PrimaryKey,
    AutoIncrement,
    Unique,
    Indexed,
    SqlType(String),
    SqlDefault(MarkerArg),
    SqlOnUpdate(MarkerArg),
}

#[derive(Debug)]
pub struct EntityInfo {
    pub schema_name: Option<String>,
}

#[derive(Debug)]
pub struct FieldInfo {
    pub ident: Ident,
    pub name: String,
    pub ty: Type,
    pub markers: Vec<Marker>,
}

impl FieldInfo {
    pub fn is_primary_key(&self) -> bool {
        self.markers.iter().any(|m| matches!(m, Marker::PrimaryKey))
    }
}

pub fn parse_entity_attributes(input: &DeriveInput) -> Result<EntityInfo> {
    let mut schema_name = None;

    for attr in &input.attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("schema") {
                let value: LitStr = meta.value()?.parse()?;
                validate_schema_name_syn(&value.value(), value.span())?;
                schema_name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported entity attribute: expected `schema = \"...\"`"))
            }
        })?;
    }

    if schema_name.is_none() {
        let derived = to_snake_case(&input.ident.unraw().to_string());
        validate_schema_name_syn(&derived, input.ident.span())?;
    }

    Ok(EntityInfo { schema_name })
}

pub fn parse_field_attributes(input: &DeriveInput) -> Result<Vec<FieldInfo>> {
    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "Entity cannot be derived for generic structs",
        ));
    }

    let fields_named = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields_named) => fields_named,
            _ => {
                return Err(Error::new(
                    proc_macro2::Span::call_site(),
                    "Entity can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                proc_macro2::Span::call_site(),
                "Entity can only be derived for structs with named fields",
            ))
        }
    };

    let mut fields = Vec::with_capacity(fields_named.named.len());
    for field in &fields_named.named {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| Error::new_spanned(field, "Field must have a name"))?;
        let name = ident.unraw().to_string();
        validate_column_name_syn(&to_snake_case(&name), ident.span())?;

        fields.push(FieldInfo {
            markers: parse_markers(&field.attrs)?,
            ident,
            name,
            ty: field.ty.clone(),
        });
    }

    let mut keys = fields.iter().filter(|f| f.is_primary_key());
    match (keys.next(), keys.next()) {
        (Some(_), None) => Ok(fields),
        (None, _) => Err(Error::new(
            proc_macro2::Span::call_site(),
            "Entity requires exactly one #[primary_key] field",
        )),
        (Some(first), Some(second)) => Err(Error::new(
            second.ident.span(),
            format!(
                "Entity has more than one #[primary_key] field ('{}' and '{}')",
                first.name, second.name
            ),
        )),
    }
}

fn parse_markers(attrs: &[Attribute]) -> Result<Vec<Marker>> {
    let mut markers = Vec::new();
    for attr in attrs {
        let path = attr.path();
        let marker = if path.is_ident("primary_key") {
            Marker::PrimaryKey
        } else if path.is_ident("auto_increment") {
            Marker::AutoIncrement
        } else if path.is_ident("unique") {
            Marker::Unique
        } else if path.is_ident("indexed") {
            Marker::Indexed
        } else if path.is_ident("sql_type") {
            let sql_type: LitStr = attr.parse_args()?;
            if sql_type.value().trim().is_empty() {
                return Err(Error::new_spanned(sql_type, "sql_type cannot be empty"));
            }
            Marker::SqlType(sql_type.value())
        } else if path.is_ident("sql_default") {
            Marker::SqlDefault(attr.parse_args()?)
        } else if path.is_ident("sql_on_update") {
            Marker::SqlOnUpdate(attr.parse_args()?)
        } else {
            continue;
        };
        markers.push(marker);
    }
    Ok(markers)
}
