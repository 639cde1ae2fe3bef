#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the Conduit workspace.
//!
//! * [`macro@conduit_error`] turns a plain enum into the workspace error shape.
//! * [`macro@main`] bootstraps an async `main` on a `conduit-runtime` profile.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! conduit-derive.workspace = true
//! thiserror.workspace = true
//! ```
//!
//! Examples are `ignore`d here since a proc-macro crate cannot use its own macros;
//! see `tests/ui` for compiled usage.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, parse_macro_input};

/// Attribute macro to bootstrap a Tokio runtime from a `conduit-runtime` profile.
///
/// The annotated `async fn` must return a `Result`. It becomes a synchronous function
/// that builds the runtime and blocks on the original body.
///
/// # Arguments
///
/// * `high_performance` - Long-running daemon profile.
/// * `memory_efficient` - Small footprint profile for tools and tests.
/// * `default` - Worker threads auto-detected from available parallelism.
///
/// # Examples
///
/// ```rust,ignore
/// #[conduit_runtime::main(high_performance)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Defines a crate error enum in the workspace style.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * A `<Name>Ext` trait adding `.context(..)` to `Result<T, Name>` and to
///   `Result<T, Source>` for every variant holding a `source`.
/// * `From<Source>` for variants with a `source` field (enables `?`).
/// * `From<&'static str>` / `From<String>` when an `Internal` variant exists.
/// * `Name::kind(&self) -> &'static str`, the variant name, for structured log fields.
/// * A private `format_context` helper used inside `#[error(..)]` strings.
///
/// # Requirements
///
/// 1. Applied to an **enum** with named-field variants only.
/// 2. Variants with a `source` (by name, `#[source]` or `#[from]`) must also carry
///    `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[conduit_derive::conduit_error]
/// pub enum SinkError {
///     #[error("Sink I/O error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Sink fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn flush() -> Result<(), SinkError> {
///     std::fs::write("/tmp/x", b"").context("Flushing factory store")?;
///     Err("not implemented".into())
/// }
/// ```
#[proc_macro_attribute]
pub fn conduit_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
