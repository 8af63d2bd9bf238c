//! Facade crate for the Folio content manager.
//!
//! Applications depend on this crate alone: it re-exports the domain and kernel crates,
//! builds every feature slice from one [`ApiConfig`], and (with `server`) assembles the
//! routes of all features.

pub use folio_domain as domain;
pub use folio_kernel as kernel;

use folio_domain::config::ApiConfig;
use folio_domain::registry::InitializedSlice;
use std::borrow::Cow;

/// Failure to bring up one of the feature slices.
#[folio_derive::folio_error]
pub enum FolioError {
    #[error("Content manager{}: {source}", format_context(.context))]
    ContentManager { source: features::content_manager::ContentManagerError, context: Option<Cow<'static, str>> },
}

#[cfg(feature = "server")]
pub mod server {
    use folio_kernel::server::ApiState;
    use folio_kernel::server::router::system_router;
    use utoipa_axum::router::OpenApiRouter;

    /// `/health` plus the routes of every feature.
    #[must_use]
    pub fn router() -> OpenApiRouter<ApiState> {
        system_router().merge(crate::features::content_manager::router())
    }
}

pub mod features {
    pub use folio_content_manager as content_manager;

    /// Features compiled into this build.
    pub const ENABLED: &[&str] = &[
        "content-manager",
        #[cfg(feature = "server")]
        "server",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Builds the state of every feature from the shared configuration.
///
/// # Errors
/// [`FolioError`] naming the feature whose declared models or settings are invalid.
pub fn init(config: &ApiConfig) -> Result<Vec<InitializedSlice>, FolioError> {
    let content_manager =
        features::content_manager::init(&config.content).context("Failed to load the declared models")?;

    Ok(vec![content_manager])
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_domain::schema::{Attribute, AttributeKind, ModelDefinition};

    #[test]
    fn content_manager_is_always_enabled() {
        assert!(features::is_enabled("content-manager"));
        assert!(!features::is_enabled("licensing"));
    }

    #[test]
    fn init_builds_one_slice_per_feature() {
        let slices = init(&ApiConfig::default()).unwrap();
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].short_name(), "ContentManager");
    }

    #[test]
    fn inconsistent_models_fail_initialization() {
        let mut config = ApiConfig::default();
        config.content.content_types =
            vec![ModelDefinition::new("article").attribute("id", Attribute::new(AttributeKind::String))];

        let err = init(&config).unwrap_err();
        assert!(matches!(err, FolioError::ContentManager { .. }));
        assert!(err.to_string().contains("Invalid schema"), "{err}");
    }
}
