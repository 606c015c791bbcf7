//! Derive macro for the palimpsest configuration library.
//!
//! This crate provides `#[derive(Bind)]`, which generates a `Bind`
//! implementation that resolves separator-joined keys against the struct's
//! fields in declaration order.
//!
//! # Basic Usage
//!
//! ```ignore
//! use palimpsest::Bind;
//!
//! #[derive(Bind, Default)]
//! struct ServerConfig {
//!     listen: String,              // bound by LISTEN
//!     #[bind(rename = "HOST")]
//!     hostname: String,            // bound by HOST
//!     #[bind(skip)]
//!     runtime_handle: u64,         // invisible to binding
//!     database: Option<Database>,  // DATABASE_* recurses
//! }
//! ```
//!
//! The source key defaults to the upper-cased field name. Sibling keys that
//! could shadow each other — one equal to another, or a prefix of another
//! followed by `_` — are rejected at compile time rather than silently
//! resolved by declaration order.

extern crate proc_macro;

mod codegen;
mod parse;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derive the `Bind` trait for a struct with named fields.
///
/// Supported field attributes:
///
/// - `#[bind(rename = "KEY")]` — use `KEY` as the source key instead of the
///   upper-cased field name.
/// - `#[bind(skip)]` — the field takes no part in binding.
#[proc_macro_derive(Bind, attributes(bind))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match codegen::derive_bind(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
