use crate::schema::ModelDefinition;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level API configuration shared across services.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub content: ContentConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Logging knobs consumed by the server binary when building the logger.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level directive (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
    pub console: bool,
    pub json: bool,
    /// Rolling log files are written here when set.
    pub directory: Option<PathBuf>,
    pub max_files: usize,
    /// Extra `EnvFilter` directives, e.g. `folio_content_manager=debug`.
    pub filter: Option<String>,
}

/// Content manager settings and the declared models.
///
/// Models are immutable at runtime: they are read once when the slice initializes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// `pageSize` used when generating default view settings.
    pub page_size: u32,
    /// Entries returned by a list request without `_limit`.
    pub default_limit: usize,
    /// Upper bound applied to `_limit`.
    pub max_limit: usize,
    pub groups: Vec<ModelDefinition>,
    pub content_types: Vec<ModelDefinition>,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 4583, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            console: true,
            json: false,
            directory: None,
            max_files: 10,
            filter: None,
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            default_limit: 100,
            max_limit: 1000,
            groups: Vec::new(),
            content_types: Vec::new(),
        }
    }
}
