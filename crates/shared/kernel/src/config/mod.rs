use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of environment variables overriding file settings.
pub const ENV_PREFIX: &str = "FOLIO";

/// File looked up when no path is given; any extension `config` understands is accepted.
pub const DEFAULT_CONFIG_FILE: &str = "server";

/// Custom error type for config loading.
#[folio_derive::folio_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Layered configuration source: a file first, then environment overrides.
///
/// Environment keys use `__` both after the prefix and between levels, so
/// `FOLIO__CONTENT__MAX_LIMIT=500` overrides `content.max_limit`.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
    required: bool,
    env_prefix: Cow<'static, str>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self { path: PathBuf::from(DEFAULT_CONFIG_FILE), required: true, env_prefix: Cow::Borrowed(ENV_PREFIX) }
    }
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }

    /// A missing file is not an error; defaults and the environment still apply.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    #[must_use]
    pub fn env_prefix(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Reads every source and deserializes the merged result.
    ///
    /// # Errors
    /// Fails when a required file is missing, a source cannot be parsed, or the merged
    /// values do not fit `T`.
    pub fn load<T>(&self) -> Result<T, ConfigError>
    where
        T: DeserializeOwned,
    {
        info!(path = %self.path.display(), required = self.required, "Loading configuration");

        Config::builder()
            .add_source(File::from(self.path.as_path()).required(self.required))
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .convert_case(config::Case::Snake),
            )
            .build()
            .context("Failed to build config")?
            .try_deserialize::<T>()
            .context("Failed to deserialize config")
    }
}

/// Loads `T` from `path` (default `server`) with `FOLIO__` environment overrides.
///
/// # Errors
/// See [`ConfigLoader::load`].
///
/// # Example
/// ```rust
/// use folio_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    match path {
        Some(path) => ConfigLoader::new().path(path).load(),
        None => ConfigLoader::new().load(),
    }
}
