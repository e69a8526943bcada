//! Code generation for the `Entity` implementation
//!
//! The metadata descriptor is built on first use and cached in a
//! `OnceLock`; field kinds and nullability come from each field type's
//! `FieldType` implementation.

use crate::parsing::{EntityInfo, FieldInfo, Marker, MarkerArg};
use proc_macro2::{Literal, TokenStream};
use quote::quote;
use syn::Ident;

pub fn generate_entity_impl(name: &Ident, entity: &EntityInfo, fields: &[FieldInfo]) -> TokenStream {
    let schema_override = entity
        .schema_name
        .as_ref()
        .map(|schema| quote! { .with_schema_name(#schema) });

    let field_metadata = fields.iter().map(|field| {
        let field_name = &field.name;
        let ty = &field.ty;
        let constraints = field.markers.iter().map(constraint_tokens);
        quote! {
            .field(
                ::rowhaus::store_object::FieldMetadata::new(
                    #field_name,
                    <#ty as ::rowhaus::type_mapping::FieldType>::kind(),
                    <#ty as ::rowhaus::type_mapping::FieldType>::NULLABLE,
                )
                #(.with(#constraints))*
            )
        }
    });

    let put_fields = fields.iter().map(|field| {
        let ident = &field.ident;
        let field_name = &field.name;
        if field.is_primary_key() {
            quote! { ::rowhaus::store_object::put_key(&mut record, #field_name, &self.#ident)?; }
        } else {
            quote! { ::rowhaus::store_object::put_field(&mut record, #field_name, &self.#ident)?; }
        }
    });

    let take_fields = fields.iter().map(|field| {
        let ident = &field.ident;
        let field_name = &field.name;
        quote! { #ident: ::rowhaus::store_object::take_field(&mut record, #field_name)?, }
    });

    quote! {
        impl ::rowhaus::store_object::Entity for #name {
            fn metadata() -> &'static ::rowhaus::store_object::EntityMetadata {
                static METADATA: ::std::sync::OnceLock<::rowhaus::store_object::EntityMetadata> =
                    ::std::sync::OnceLock::new();
                METADATA.get_or_init(|| {
                    ::rowhaus::store_object::EntityMetadata::new(
                        ::core::concat!(::core::module_path!(), "::", ::core::stringify!(#name))
                    )
                    #schema_override
                    #(#field_metadata)*
                })
            }

            fn to_record(
                &self,
            ) -> ::core::result::Result<::rowhaus::store_object::Record, ::rowhaus::store_object::MapperError> {
                let mut record = ::rowhaus::store_object::Record::new();
                #(#put_fields)*
                ::core::result::Result::Ok(record)
            }

            fn from_record(
                mut record: ::rowhaus::store_object::Record,
            ) -> ::core::result::Result<Self, ::rowhaus::store_object::MapperError> {
                ::core::result::Result::Ok(Self {
                    #(#take_fields)*
                })
            }
        }
    }
}

fn constraint_tokens(marker: &Marker) -> TokenStream {
    match marker {
        Marker::PrimaryKey => quote! { ::rowhaus::store_object::Constraint::PrimaryKey },
        Marker::AutoIncrement => quote! { ::rowhaus::store_object::Constraint::AutoIncrement },
        Marker::Unique => quote! { ::rowhaus::store_object::Constraint::Unique },
        Marker::Indexed => quote! { ::rowhaus::store_object::Constraint::Indexed },
        Marker::SqlType(sql_type) => quote! {
            ::rowhaus::store_object::Constraint::SqlType(::std::string::String::from(#sql_type))
        },
        Marker::SqlDefault(arg) => {
            let value = marker_value_tokens(arg);
            quote! { ::rowhaus::store_object::Constraint::SqlDefault(#value) }
        }
        Marker::SqlOnUpdate(arg) => {
            let value = marker_value_tokens(arg);
            quote! { ::rowhaus::store_object::Constraint::SqlOnUpdate(#value) }
        }
    }
}

fn marker_value_tokens(arg: &MarkerArg) -> TokenStream {
    let literal = match arg {
        MarkerArg::Constant(constant) => {
            return quote! {
                ::rowhaus::store_object::MarkerValue::Constant(
                    ::rowhaus::store_object::NamedConstant::#constant
                )
            };
        }
        MarkerArg::Text(text) => quote! {
            ::rowhaus::type_mapping::SqlValue::Text(::std::string::String::from(#text))
        },
        MarkerArg::Integer(i64::MIN) => quote! {
            ::rowhaus::type_mapping::SqlValue::Integer(::core::primitive::i64::MIN)
        },
        MarkerArg::Integer(value) => {
            let value = Literal::i64_suffixed(*value);
            quote! { ::rowhaus::type_mapping::SqlValue::Integer(#value) }
        }
        MarkerArg::Real(value) => {
            let value = Literal::f64_suffixed(*value);
            quote! { ::rowhaus::type_mapping::SqlValue::Real(#value) }
        }
        MarkerArg::Boolean(value) => quote! { ::rowhaus::type_mapping::SqlValue::Boolean(#value) },
    };
    quote! { ::rowhaus::store_object::MarkerValue::Literal(#literal) }
}
