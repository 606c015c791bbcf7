//! Attribute parsing and source-key validation for the Bind derive macro.
//!
//! This module turns the struct's fields into a list of bindable fields with
//! their effective source keys, and rejects key sets where one sibling could
//! shadow another.

use proc_macro2::Span;
use syn::{Data, DeriveInput, Error, Fields, Ident, LitStr, Result};

/// A field that participates in binding.
pub struct BindField {
    pub ident: Ident,
    pub source_key: String,
    pub span: Span,
}

/// Extract the bindable fields of a struct, in declaration order.
///
/// Fields marked `#[bind(skip)]` are omitted. The effective source key is
/// the `rename` value or the upper-cased field name.
pub fn bind_fields(input: &DeriveInput) -> Result<Vec<BindField>> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new_spanned(
                    &input.ident,
                    "#[derive(Bind)] requires named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new_spanned(
                &input.ident,
                "#[derive(Bind)] only supports structs",
            ))
        }
    };

    let mut out = Vec::new();
    for field in fields {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| Error::new_spanned(field, "expected a named field"))?;

        let mut rename: Option<String> = None;
        let mut skip = false;
        for attr in &field.attrs {
            if !attr.path().is_ident("bind") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let lit: LitStr = meta.value()?.parse()?;
                    if lit.value().is_empty() {
                        return Err(meta.error("rename value must not be empty"));
                    }
                    rename = Some(lit.value());
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else {
                    Err(meta.error("unknown bind attribute; expected `rename` or `skip`"))
                }
            })?;
        }

        if skip {
            continue;
        }

        let span = ident.span();
        let source_key = rename.unwrap_or_else(|| ident.to_string().to_uppercase());
        out.push(BindField {
            ident,
            source_key,
            span,
        });
    }
    Ok(out)
}

/// Reject sibling source keys that could shadow each other.
///
/// Resolution tries fields in declaration order and the first match wins, so
/// a key equal to another, or forming another's `_`-separated prefix, would
/// make one field unreachable depending on ordering. That is a bug in the
/// struct definition, caught here instead of at runtime.
pub fn check_ambiguous_keys(fields: &[BindField]) -> Result<()> {
    for (i, a) in fields.iter().enumerate() {
        for b in &fields[i + 1..] {
            if keys_shadow(&a.source_key, &b.source_key) {
                return Err(Error::new(
                    b.span,
                    format!(
                        "source key `{}` is ambiguous with sibling key `{}`; \
                         rename one with #[bind(rename = \"...\")]",
                        b.source_key, a.source_key
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// Whether two sibling source keys can claim the same input key.
fn keys_shadow(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let (short, long) = if a.len() < b.len() { (a, b) } else { (b, a) };
    long.starts_with(short) && long[short.len()..].starts_with('_')
}
