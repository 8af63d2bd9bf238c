use axum::Router;
use folio::domain::constants::{CONTENT_MANAGER_TAG, SYSTEM_TAG};
use folio::kernel::server::ApiState;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

/// Path of the interactive API reference.
pub(crate) const API_REFERENCE_PATH: &str = "/api";

#[derive(OpenApi)]
#[openapi(
    info(title = "Folio", description = "Headless content manager"),
    tags(
        (name = SYSTEM_TAG, description = "Liveness and diagnostics"),
        (name = CONTENT_MANAGER_TAG, description = "Model configuration and entry explorer"),
    )
)]
struct ApiDoc;

/// Feature routes with request tracing, plus the Scalar reference of their OpenAPI document.
pub(crate) fn init(state: ApiState) -> Router {
    let (routes, document) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(folio::server::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .split_for_parts();

    routes.merge(Scalar::with_url(API_REFERENCE_PATH, document))
}
