mod content_types;
mod explorer;
mod extract;
mod groups;

use folio_kernel::server::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub(crate) fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(groups::list_groups))
        .routes(routes!(groups::find_group, groups::update_group))
        .routes(routes!(content_types::list_content_types))
        .routes(routes!(content_types::find_content_type, content_types::update_content_type))
        .routes(routes!(explorer::list_entries, explorer::create_entry))
        .routes(routes!(explorer::count_entries))
        .routes(routes!(explorer::find_entry, explorer::update_entry, explorer::delete_entry))
}
