#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the outclick crates.
//!
//! Currently this is a single attribute, [`macro@outclick_error`], used to declare every
//! error enum in the workspace with the same shape: `thiserror` display strings, source
//! conversions, and a `.context()` extension trait.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for declaring error enums.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * `<ErrorName>Ext` trait with `.context(...)` for `Result<T, ErrorName>` and, for each
///   variant wrapping an upstream error, for `Result<T, SourceError>` as well.
/// * `From<SourceError>` for variants with a `source` field (or a `#[source]`/`#[from]` field).
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }` variant exists.
/// * A private `format_context` helper for use inside `#[error(...)]` strings.
///
/// # Requirements
///
/// * Only enums with named-field variants are accepted.
/// * A `context` field must have the type `Option<Cow<'static, str>>`.
/// * Variants wrapping a source error must also carry a `context` field.
/// * One annotated enum per module, since the `format_context` helper is emitted alongside it.
///
/// # Example
///
/// ```rust,ignore
/// use outclick_derive::outclick_error;
/// use std::borrow::Cow;
///
/// #[outclick_error]
/// pub enum SelectorError {
///     #[error("Empty selector{}: {message}", format_context(.context))]
///     Empty { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
///
///     #[error("Internal selector error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn parse(input: &str) -> Result<(), SelectorError> {
///     if input.trim().is_empty() {
///         return Err("nothing to parse".into());
///     }
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn outclick_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}
