#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the workspace crates.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! mgraph-derive = { path = "../infra/derive" }
//! thiserror = "2"
//! ```
//!
//! Examples are `ignore`d to avoid compiling in this crate; the trybuild suite under
//! `tests/ui` exercises the expansion.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining the error enums of a crate.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Context Support**: Generates a companion `<Name>Ext` trait that adds `.context()`
///   to `Result<T, Name>` and to `Result<T, Source>` for every wrapped source error.
/// * **Context Accessor**: Adds `Name::context_note()` returning the attached note.
/// * **Standard Conversions**: Implements `From<Source>` for variants with a `source` field,
///   enabling `?` on upstream errors.
/// * **Internal Fallback**: Provides `From<&'static str>` and `From<String>` when an
///   `Internal { message, context }` variant is present.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with named-field variants only.
/// 2. Variants that support context include a `context: Option<Cow<'static, str>>` field.
/// 3. Variants wrapping upstream errors include a `source: T` field (or a field marked
///    `#[source]`/`#[from]`) together with `context`.
/// 4. The expansion defines a private `format_context` helper, so declare one error
///    enum per module.
///
/// # Example
///
/// ```rust,ignore
/// use mgraph_derive::mgraph_error;
/// use std::borrow::Cow;
///
/// #[mgraph_error]
/// pub enum SchemaError {
///     #[error("Parse error{}: {source}", format_context(.context))]
///     Parse { source: serde_json::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load(text: &str) -> Result<serde_json::Value, SchemaError> {
///     let value = serde_json::from_str(text).context("Reading model file")?;
///     Ok(value)
/// }
/// ```
#[proc_macro_attribute]
pub fn mgraph_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}
