#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Attribute macros shared by every Folio crate: error enums, feature slices, and the
//! API surface (request/response models and documented handlers).
//!
//! The examples below are `ignore`d because a proc-macro crate cannot use its own macros;
//! see `tests/folio_error.rs` for a compiled usage of [`macro@folio_error`].

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Defines a standard API data model.
///
/// * Adds `Debug`, `Serialize` and `Deserialize` when they are not derived already.
/// * Adds `utoipa::ToSchema` behind the consuming crate's `server` feature.
/// * Applies `#[serde(rename_all = "camelCase")]` and `#[serde(deny_unknown_fields)]`
///   unless told otherwise.
///
/// # Arguments
///
/// * `rename_all = "..."` - Overrides the serde rename policy.
/// * `deny_unknown_fields = false` - Lets unknown fields through on deserialization.
///
/// # Example
///
/// ```rust,ignore
/// use folio_derive::api_model;
///
/// #[api_model(deny_unknown_fields = false)]
/// pub struct CountResponse {
///     pub count: usize,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Bridges an Axum handler with its `OpenAPI` description.
///
/// Accepts the regular `utoipa::path` arguments (`get`, `path = "..."`, `params(...)`,
/// `responses(...)`, `tag = ...`) and forwards them when the `server` feature is enabled.
///
/// # Example
///
/// ```rust,ignore
/// #[api_handler(
///     get,
///     path = "/content-manager/groups",
///     responses((status = OK, body = ModelListResponse)),
///     tag = CONTENT_MANAGER_TAG,
/// )]
/// pub async fn list_groups(State(state): State<ApiState>) -> Result<Json<ModelListResponse>> {
///     // ...
/// }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Turns an enum into the crate's error type.
///
/// # Features
///
/// * Derives `Debug` and `thiserror::Error` when missing.
/// * Generates a `<Name>Ext` trait whose `.context(...)` annotates both `Result<T, Name>`
///   and `Result<T, Source>` for every variant carrying a source error.
/// * Implements `From<Source>` for those variants so `?` works on upstream errors.
/// * Implements `From<&'static str>` and `From<String>` when an `Internal` variant exists.
///
/// # Requirements
///
/// 1. Only enums with named-field variants are accepted.
/// 2. Context-aware variants declare `context: Option<Cow<'static, str>>`.
/// 3. Variants with a `source` field (or a `#[source]`/`#[from]` field) must also carry a
///    `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use folio_derive::folio_error;
/// use std::borrow::Cow;
///
/// #[folio_error]
/// pub enum ConfigError {
///     #[error("Config error{}: {source}", format_context(.context))]
///     Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load() -> Result<Settings, ConfigError> {
///     builder.build().context("Failed to build config")?.try_deserialize().map_err(Into::into)
/// }
/// ```
#[proc_macro_attribute]
pub fn folio_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Defines a feature slice handle.
///
/// The annotated struct becomes `<Name>Inner`; `<Name>` is generated as a cheap `Arc`
/// wrapper that derefs to the inner state and implements
/// `folio_kernel::domain::registry::FeatureSlice`.
///
/// # Example
/// ```rust,ignore
/// #[folio_derive::folio_slice]
/// pub struct ContentManager {
///     pub registry: ContentTypeRegistry,
/// }
///
/// let slice = ContentManager::new(ContentManagerInner { registry });
/// ```
#[proc_macro_attribute]
pub fn folio_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
