//! Code generation for the Bind derive macro.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

use crate::parse;

/// Generate the `Bind` implementation for a struct.
///
/// The generated body mirrors the hand-written pattern: an empty key on a
/// structured record is an unsupported-type error; otherwise each field is
/// tried in declaration order through `split_key`, and the first field that
/// accepts the key wins.
pub fn derive_bind(input: DeriveInput) -> Result<TokenStream> {
    let fields = parse::bind_fields(&input)?;
    parse::check_ambiguous_keys(&fields)?;

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let arms = fields.iter().map(|field| {
        let ident = &field.ident;
        let source_key = &field.source_key;
        quote! {
            if let ::core::option::Option::Some(rest) =
                ::palimpsest::split_key(key, #source_key, sep)
            {
                if ::palimpsest::Bind::bind_text(&mut self.#ident, rest, sep, value)? {
                    return ::core::result::Result::Ok(true);
                }
            }
        }
    });

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics ::palimpsest::Bind for #name #ty_generics #where_clause {
            fn bind_text(
                &mut self,
                key: &str,
                sep: char,
                value: &str,
            ) -> ::core::result::Result<bool, ::palimpsest::CoerceError> {
                if key.is_empty() {
                    return ::core::result::Result::Err(
                        ::palimpsest::CoerceError::Unsupported(
                            ::core::any::type_name::<Self>(),
                        ),
                    );
                }
                #(#arms)*
                ::core::result::Result::Ok(false)
            }
        }
    })
}
