use super::extract::Payload;
use crate::ContentManager;
use crate::configuration::ConfigurationUpdate;
use crate::dto::{ModelListResponse, ModelResponse};
use crate::error::ContentManagerError;
use axum::Json;
use axum::extract::{Path, State};
use folio_derive::api_handler;
use folio_domain::constants::CONTENT_MANAGER_TAG;
use folio_domain::schema::ModelKind;
use folio_kernel::server::{ApiState, ErrorBody};

#[api_handler(
    get,
    path = "/content-manager/groups",
    responses((status = OK, description = "Every registered group", body = ModelListResponse)),
    tag = CONTENT_MANAGER_TAG,
)]
pub(super) async fn list_groups(
    State(state): State<ApiState>,
) -> Result<Json<ModelListResponse>, ContentManagerError> {
    let manager = state.try_get_slice::<ContentManager>()?;
    Ok(Json(manager.list_models(ModelKind::Group)?))
}

#[api_handler(
    get,
    path = "/content-manager/groups/{uid}",
    params(("uid" = String, Path, description = "Group uid")),
    responses(
        (status = OK, description = "Group schema with its configuration", body = ModelResponse),
        (status = NOT_FOUND, description = "`group.notFound`", body = ErrorBody),
    ),
    tag = CONTENT_MANAGER_TAG,
)]
pub(super) async fn find_group(
    State(state): State<ApiState>,
    Path(uid): Path<String>,
) -> Result<Json<ModelResponse>, ContentManagerError> {
    let manager = state.try_get_slice::<ContentManager>()?;
    Ok(Json(manager.find_model(ModelKind::Group, &uid)?))
}

#[api_handler(
    put,
    path = "/content-manager/groups/{uid}",
    params(("uid" = String, Path, description = "Group uid")),
    request_body = ConfigurationUpdate,
    responses(
        (status = OK, description = "Stored configuration", body = ModelResponse),
        (status = BAD_REQUEST, description = "Every violation of the body", body = ErrorBody),
        (status = NOT_FOUND, description = "`group.notFound`", body = ErrorBody),
    ),
    tag = CONTENT_MANAGER_TAG,
)]
#[tracing::instrument(skip(state, body))]
pub(super) async fn update_group(
    State(state): State<ApiState>,
    Path(uid): Path<String>,
    Payload(body): Payload,
) -> Result<Json<ModelResponse>, ContentManagerError> {
    let manager = state.try_get_slice::<ContentManager>()?;
    let updated = manager.update_model(ModelKind::Group, &uid, &body)?;
    tracing::debug!("Group configuration updated");

    Ok(Json(updated))
}
