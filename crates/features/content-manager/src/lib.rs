//! Content manager feature slice.
//!
//! Serves the presentation configuration of groups and content types, and an explorer API
//! that stores entries after coercing them against their model.

mod coercion;
mod configuration;
mod dto;
mod entries;
mod error;
mod formatting;
mod registry;
mod service;
mod validation;

#[cfg(feature = "server")]
mod http;

pub use crate::coercion::coerce_scalar;
pub use crate::configuration::{
    ConfigurationKey, ConfigurationStore, ConfigurationUpdate, FieldMetadata, Layouts, MemoryConfigurationStore,
    ModelConfiguration, Settings, SortOrder,
};
pub use crate::dto::{CountResponse, EntryDocument, ListParams, ModelListResponse, ModelResponse, ModelView};
pub use crate::entries::ENTRY_NOT_FOUND;
pub use crate::error::{ContentManagerError, ContentManagerErrorExt, ValidationErrors, ValidationIssue};
pub use crate::formatting::{FormattedModel, FormattedSchema};
pub use crate::registry::ModelRegistry;
pub use crate::service::{CONTENT_TYPE_NOT_FOUND, GROUP_NOT_FOUND};

use crate::configuration::ConfigurationService;
use crate::entries::EntryStore;
use folio_domain::config::ContentConfig;
use folio_kernel::domain::registry::InitializedSlice;
use std::sync::Arc;

/// Content manager feature state
#[folio_derive::folio_slice]
pub struct ContentManager {
    registry: Arc<ModelRegistry>,
    configurations: ConfigurationService,
    entries: EntryStore,
    default_limit: usize,
    max_limit: usize,
}

/// Initialize the content manager with an in-memory configuration store.
///
/// # Errors
///
/// Returns [`ContentManagerError::Schema`] when the declared models are inconsistent.
pub fn init(config: &ContentConfig) -> Result<InitializedSlice, ContentManagerError> {
    init_with_store(config, Arc::new(MemoryConfigurationStore::default()))
}

/// Initialize the content manager on top of a caller-provided configuration store.
///
/// # Errors
///
/// Returns [`ContentManagerError::Schema`] when the declared models are inconsistent.
pub fn init_with_store(
    config: &ContentConfig,
    store: Arc<dyn ConfigurationStore>,
) -> Result<InitializedSlice, ContentManagerError> {
    let registry = Arc::new(ModelRegistry::from_config(config)?);

    let inner = ContentManagerInner {
        configurations: ConfigurationService::new(store, config.page_size),
        entries: EntryStore::new(registry.clone()),
        default_limit: config.default_limit,
        max_limit: config.max_limit.max(1),
        registry,
    };

    tracing::info!(
        groups = config.groups.len(),
        content_types = config.content_types.len(),
        "Content manager slice initialized"
    );

    Ok(InitializedSlice::new(ContentManager::new(inner)))
}

/// Routes of the content manager: model configuration and the entry explorer.
#[cfg(feature = "server")]
#[must_use]
pub fn router() -> utoipa_axum::router::OpenApiRouter<folio_kernel::server::ApiState> {
    http::router()
}
