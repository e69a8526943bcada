//! Procedural macros for generating entity metadata and record conversion
//!
//! This crate provides the `#[model]` macro and the `Entity` derive. The
//! generated code refers to items through the `rowhaus` facade crate.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod entity_impl;
mod model_macro;
mod parsing;

use entity_impl::generate_entity_impl;
use model_macro::model_attribute;
use parsing::{parse_entity_attributes, parse_field_attributes};

/// Derive macro for the `Entity` trait
///
/// Note: It's recommended to use the `#[model]` attribute macro instead,
/// which adds this derive along with `Debug` and `Clone`.
///
/// ```ignore
/// #[derive(Debug, Clone, Entity)]
/// #[entity(schema = "test")]
/// pub struct Test {
///     #[primary_key]
///     pub id: Option<i64>,
///
///     pub value: String,
///
///     #[sql_default("bar")]
///     pub has_default: String,
/// }
/// ```
///
/// Field markers, applied in declaration order: `primary_key`,
/// `auto_increment`, `unique`, `indexed`, `sql_type("..")`,
/// `sql_default(<literal> | CurrentTimestamp)` and
/// `sql_on_update(<literal> | CurrentTimestamp)`.
#[proc_macro_derive(
    Entity,
    attributes(
        entity,
        primary_key,
        auto_increment,
        unique,
        indexed,
        sql_type,
        sql_default,
        sql_on_update
    )
)]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let entity_info = match parse_entity_attributes(&input) {
        Ok(info) => info,
        Err(e) => return e.to_compile_error().into(),
    };

    let field_info = match parse_field_attributes(&input) {
        Ok(info) => info,
        Err(e) => return e.to_compile_error().into(),
    };

    TokenStream::from(generate_entity_impl(&input.ident, &entity_info, &field_info))
}

/// Convenience attribute macro that adds all necessary derives for an entity
///
/// Usage:
/// ```ignore
/// use rowhaus::prelude::*;
///
/// #[model]
/// pub struct User {
///     #[primary_key]
///     #[auto_increment]
///     pub id: Option<i64>,
///     #[unique]
///     pub email: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn model(attr: TokenStream, item: TokenStream) -> TokenStream {
    model_attribute(attr, item)
}
