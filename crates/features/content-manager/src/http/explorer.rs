//! Entry CRUD for content types.

use super::extract::Payload;
use crate::ContentManager;
use crate::dto::{CountResponse, EntryDocument, ListParams};
use crate::error::ContentManagerError;
use axum::Json;
use axum::extract::{Path, Query, State};
use folio_derive::api_handler;
use folio_domain::constants::CONTENT_MANAGER_TAG;
use folio_kernel::server::{ApiState, ErrorBody};
use serde_json::Value;

#[api_handler(
    get,
    path = "/content-manager/explorer/{model}",
    params(("model" = String, Path, description = "Content type uid"), ListParams),
    responses(
        (status = OK, description = "One page of entries", body = [EntryDocument]),
        (status = BAD_REQUEST, description = "Invalid pagination or sort", body = ErrorBody),
        (status = NOT_FOUND, description = "`contentType.notFound`", body = ErrorBody),
    ),
    tag = CONTENT_MANAGER_TAG,
)]
pub(super) async fn list_entries(
    State(state): State<ApiState>,
    Path(model): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Value>>, ContentManagerError> {
    let manager = state.try_get_slice::<ContentManager>()?;
    Ok(Json(manager.list_entries(&model, &params)?))
}

#[api_handler(
    get,
    path = "/content-manager/explorer/{model}/count",
    params(("model" = String, Path, description = "Content type uid")),
    responses(
        (status = OK, description = "Number of stored entries", body = CountResponse),
        (status = NOT_FOUND, description = "`contentType.notFound`", body = ErrorBody),
    ),
    tag = CONTENT_MANAGER_TAG,
)]
pub(super) async fn count_entries(
    State(state): State<ApiState>,
    Path(model): Path<String>,
) -> Result<Json<CountResponse>, ContentManagerError> {
    let manager = state.try_get_slice::<ContentManager>()?;
    Ok(Json(manager.count_entries(&model)?))
}

#[api_handler(
    post,
    path = "/content-manager/explorer/{model}",
    params(("model" = String, Path, description = "Content type uid")),
    request_body(content = EntryDocument, description = "JSON body, or multipart with a `data` part"),
    responses(
        (status = OK, description = "Created entry", body = EntryDocument),
        (status = BAD_REQUEST, description = "Invalid or unreadable input", body = ErrorBody),
        (status = NOT_FOUND, description = "`contentType.notFound`", body = ErrorBody),
    ),
    tag = CONTENT_MANAGER_TAG,
)]
#[tracing::instrument(skip(state, body))]
pub(super) async fn create_entry(
    State(state): State<ApiState>,
    Path(model): Path<String>,
    Payload(body): Payload,
) -> Result<Json<EntryDocument>, ContentManagerError> {
    let manager = state.try_get_slice::<ContentManager>()?;
    Ok(Json(EntryDocument(manager.create_entry(&model, &body)?)))
}

#[api_handler(
    get,
    path = "/content-manager/explorer/{model}/{id}",
    params(
        ("model" = String, Path, description = "Content type uid"),
        ("id" = u64, Path, description = "Entry id"),
    ),
    responses(
        (status = OK, description = "Entry with its groups", body = EntryDocument),
        (status = NOT_FOUND, description = "`contentType.notFound` or `entry.notFound`", body = ErrorBody),
    ),
    tag = CONTENT_MANAGER_TAG,
)]
pub(super) async fn find_entry(
    State(state): State<ApiState>,
    Path((model, id)): Path<(String, String)>,
) -> Result<Json<EntryDocument>, ContentManagerError> {
    let manager = state.try_get_slice::<ContentManager>()?;
    Ok(Json(EntryDocument(manager.find_entry(&model, &id)?)))
}

#[api_handler(
    put,
    path = "/content-manager/explorer/{model}/{id}",
    params(
        ("model" = String, Path, description = "Content type uid"),
        ("id" = u64, Path, description = "Entry id"),
    ),
    request_body(content = EntryDocument, description = "JSON body, or multipart with a `data` part"),
    responses(
        (status = OK, description = "Updated entry", body = EntryDocument),
        (status = BAD_REQUEST, description = "Invalid input or unknown nested id", body = ErrorBody),
        (status = NOT_FOUND, description = "`contentType.notFound` or `entry.notFound`", body = ErrorBody),
    ),
    tag = CONTENT_MANAGER_TAG,
)]
#[tracing::instrument(skip(state, body))]
pub(super) async fn update_entry(
    State(state): State<ApiState>,
    Path((model, id)): Path<(String, String)>,
    Payload(body): Payload,
) -> Result<Json<EntryDocument>, ContentManagerError> {
    let manager = state.try_get_slice::<ContentManager>()?;
    Ok(Json(EntryDocument(manager.update_entry(&model, &id, &body)?)))
}

#[api_handler(
    delete,
    path = "/content-manager/explorer/{model}/{id}",
    params(
        ("model" = String, Path, description = "Content type uid"),
        ("id" = u64, Path, description = "Entry id"),
    ),
    responses(
        (status = OK, description = "Deleted entry", body = EntryDocument),
        (status = NOT_FOUND, description = "`contentType.notFound` or `entry.notFound`", body = ErrorBody),
    ),
    tag = CONTENT_MANAGER_TAG,
)]
#[tracing::instrument(skip(state))]
pub(super) async fn delete_entry(
    State(state): State<ApiState>,
    Path((model, id)): Path<(String, String)>,
) -> Result<Json<EntryDocument>, ContentManagerError> {
    let manager = state.try_get_slice::<ContentManager>()?;
    Ok(Json(EntryDocument(manager.delete_entry(&model, &id)?)))
}
