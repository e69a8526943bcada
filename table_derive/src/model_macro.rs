use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Error};

/// Re-emit the struct with `Debug`, `Clone` and `Entity` derived
pub fn model_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return Error::new(
            proc_macro2::Span::call_site(),
            "model takes no arguments; use #[entity(schema = \"...\")] to name the schema",
        )
        .to_compile_error()
        .into();
    }

    let input = parse_macro_input!(item as DeriveInput);

    if !matches!(input.data, Data::Struct(_)) {
        return Error::new_spanned(&input.ident, "model can only be used on structs")
            .to_compile_error()
            .into();
    }

    let expanded = quote! {
        #[derive(::core::fmt::Debug, ::core::clone::Clone, ::rowhaus::Entity)]
        #input
    };

    TokenStream::from(expanded)
}
