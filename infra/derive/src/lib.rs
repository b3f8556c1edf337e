#![allow(unreachable_pub)]

//! # Macros
//!
//! Procedural macros for the RSVP Relay workspace.
//!
//! * [`macro@rsvp_error`]: every library crate declares its error enum with it.
//! * [`macro@api_model`] / [`macro@api_handler`]: HTTP DTOs and documented handlers.

mod api;
mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Declares a crate error enum wired for `?`-propagation and context annotation.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless the enum already derives them.
/// * `pub type Result<T, E = Name>` in the same module.
/// * `<Name>Ext` trait adding `.context(..)` to `Result<T, Name>` and to
///   `Result<T, Source>` for every variant with a source field.
/// * `From<Source>` for every variant with a source field (except `Internal`).
/// * `From<&'static str>` / `From<String>` when an `Internal { message, .. }`
///   variant exists.
/// * A module-private `format_context` helper for `#[error(..)]` strings.
///
/// # Requirements
///
/// Variants must have named fields. A variant with a `source` field (or a field
/// marked `#[source]`/`#[from]`) must also carry
/// `context: Option<Cow<'static, str>>`. Declare at most one error enum per module.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[rsvp_derive::rsvp_error]
/// pub enum StoreError {
///     #[error("IO error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &str) -> Result<String> {
///     std::fs::read_to_string(path).context("Reading guest list")
/// }
/// ```
#[proc_macro_attribute]
pub fn rsvp_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}

/// Marks a struct as an HTTP wire model.
///
/// Adds `Debug`, `serde::Serialize`, `serde::Deserialize` and `utoipa::ToSchema`
/// when missing, `#[serde(rename_all = "snake_case")]` and
/// `#[serde(deny_unknown_fields)]`.
///
/// Arguments: `rename_all = "..."` and `deny_unknown_fields = bool`.
#[proc_macro_attribute]
pub fn api_model(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    api::expand_model(args.into(), input).into()
}

/// Documents an axum handler; arguments are passed to `utoipa::path` unchanged.
///
/// ```rust,ignore
/// #[api_handler(get, path = "/health", responses((status = OK, body = HealthResponse)))]
/// pub async fn health() -> Json<HealthResponse> { .. }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    api::expand_handler(args.into(), input).into()
}
