use axum::extract::FromRef;
use folio_domain::config::{ApiConfig, ContentConfig};
use folio_domain::registry::{FeatureSlice, InitializedSlice};
use fxhash::FxHashMap;
use std::any::{TypeId, type_name};
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[folio_derive::folio_error]
pub enum ApiStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("State missing feature slice{}: {message}", format_context(.context))]
    MissingSlice { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ApiStateError {
    fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into(), context: None }
    }
}

#[derive(Debug)]
pub struct ApiStateInner {
    pub config: ApiConfig,
    started_at: Instant,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

/// Shared application state handed to every handler.
///
/// Cloning is cheap; every clone points at the same configuration and feature slices.
#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }

    #[must_use]
    pub fn get_slice<T: FeatureSlice>(&self) -> Option<&T> {
        self.slices.get(&TypeId::of::<T>()).and_then(InitializedSlice::downcast_ref::<T>)
    }

    /// Returns a reference to the slice if it is registered.
    ///
    /// # Errors
    /// [`ApiStateError::MissingSlice`] naming `T` when the slice was never registered.
    pub fn try_get_slice<T: FeatureSlice>(&self) -> Result<&T, ApiStateError> {
        self.get_slice::<T>()
            .ok_or_else(|| ApiStateError::MissingSlice { message: type_name::<T>().into(), context: None })
    }

    /// Short type names of the registered slices, sorted.
    #[must_use]
    pub fn slice_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.slices.values().map(InitializedSlice::short_name).collect();
        names.sort_unstable();
        names
    }

    /// Time since the state was built.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<ApiState> for ApiConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.config.clone()
    }
}

impl FromRef<ApiState> for ContentConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.config.content.clone()
    }
}

/// Collects the configuration and the initialized slices; [`ApiStateBuilder::build`]
/// checks them together.
#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: Option<ApiConfig>,
    slices: Vec<InitializedSlice>,
}

impl ApiStateBuilder {
    #[must_use]
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn register_slice(mut self, slice: InitializedSlice) -> Self {
        self.slices.push(slice);
        self
    }

    #[must_use]
    pub fn register_slices<I>(mut self, slices: I) -> Self
    where
        I: IntoIterator<Item = InitializedSlice>,
    {
        self.slices.extend(slices);
        self
    }

    /// # Errors
    /// [`ApiStateError::Validation`] when the configuration is missing, the content limits
    /// are inconsistent, or one slice type is registered twice.
    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let config = self.config.ok_or_else(|| ApiStateError::validation("ApiConfig not provided"))?;
        check_content_limits(&config.content)?;

        let mut slices = FxHashMap::default();
        for slice in self.slices {
            if let Some(previous) = slices.insert(slice.id, slice) {
                return Err(ApiStateError::validation(format!("Slice {} registered twice", previous.name)));
            }
        }

        Ok(ApiState { inner: Arc::new(ApiStateInner { config, started_at: Instant::now(), slices }) })
    }
}

fn check_content_limits(content: &ContentConfig) -> Result<(), ApiStateError> {
    if content.page_size == 0 {
        return Err(ApiStateError::validation("content.page_size must be positive"));
    }
    if content.default_limit == 0 || content.default_limit > content.max_limit {
        return Err(ApiStateError::validation(format!(
            "content.default_limit ({}) must be positive and at most content.max_limit ({})",
            content.default_limit, content.max_limit
        )));
    }
    Ok(())
}
