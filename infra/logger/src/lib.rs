//! # Logger
//!
//! Installs the process-wide `tracing` subscriber for Folio binaries: an optional
//! console output, optional rolling log files, and one shared `EnvFilter`.
//!
//! ## Example
//!
//! ```rust
//! # use folio_logger::{Logger, LevelFilter};
//! let _logger = Logger::builder("folio-server")
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

const LOG_FILE_SUFFIX: &str = "log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Rolling file output: `<directory>/<name>.<date>.log`.
#[derive(Debug, Clone)]
pub struct FileOutput {
    pub directory: PathBuf,
    pub rotation: Rotation,
    /// Rotated files kept on disk.
    pub max_files: usize,
}

impl FileOutput {
    /// Daily rotation, ten files retained.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into(), rotation: Rotation::DAILY, max_files: 10 }
    }

    #[must_use]
    pub const fn max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    #[must_use]
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Builder for the global tracing subscriber, created by [`Logger::builder`].
#[must_use = "call .init() to install the subscriber"]
#[derive(Debug)]
pub struct LoggerBuilder {
    name: String,
    level: LevelFilter,
    filter: Option<String>,
    console: bool,
    json: bool,
    file: Option<FileOutput>,
}

impl LoggerBuilder {
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Filter directives such as `folio_content_manager=debug,tower_http=info`.
    ///
    /// Replaces `RUST_LOG`; invalid directives make [`LoggerBuilder::init`] fail.
    pub fn filter(mut self, directives: impl Into<String>) -> Self {
        self.filter = Some(directives.into());
        self
    }

    pub const fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Emits JSON lines on every enabled output.
    pub const fn json(mut self, enabled: bool) -> Self {
        self.json = enabled;
        self
    }

    pub fn file(mut self, output: FileOutput) -> Self {
        self.file = Some(output);
        self
    }

    /// Installs the global subscriber.
    ///
    /// The returned [`Logger`] owns the background file writer and must outlive logging.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for a blank name, zero retention, a bad
    ///   filter, or no enabled output.
    /// * [`LoggerError::Io`] if the log directory cannot be created.
    /// * [`LoggerError::Appender`] if the rolling file appender cannot be created.
    /// * [`LoggerError::Subscriber`] if a global subscriber is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        self.validate()?;
        let filter = self.env_filter()?;

        let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);
        if self.console {
            let console = layer().with_ansi(true);
            layers.push(if self.json { console.json().boxed() } else { console.compact().boxed() });
        }

        let guard = match &self.file {
            Some(output) => {
                let (writer, guard) = tracing_appender::non_blocking(self.appender(output)?);
                let file = layer().with_writer(writer).with_ansi(false);
                layers.push(if self.json { file.json().boxed() } else { file.boxed() });
                Some(guard)
            },
            None => None,
        };

        tracing_subscriber::registry().with(layers).with(filter).try_init()?;
        tracing::debug!(logger = %self.name, file = self.file.is_some(), "Logging initialized");

        Ok(Logger { guard })
    }

    fn validate(&self) -> Result<(), LoggerError> {
        if self.name.trim().is_empty() {
            return Err(LoggerError::invalid("Logger name cannot be empty"));
        }
        if self.file.as_ref().is_some_and(|output| output.max_files == 0) {
            return Err(LoggerError::invalid("max_files must be greater than zero"));
        }
        if !self.console && self.file.is_none() {
            return Err(LoggerError::invalid("No logging outputs enabled. Enable the console or a log directory."));
        }
        Ok(())
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggerError> {
        let builder = EnvFilter::builder().with_default_directive(self.level.into());
        match &self.filter {
            Some(directives) => builder
                .parse(directives)
                .map_err(|e| LoggerError::invalid(format!("Invalid filter '{directives}': {e}"))),
            None => Ok(builder.from_env_lossy()),
        }
    }

    fn appender(&self, output: &FileOutput) -> Result<RollingFileAppender, LoggerError> {
        fs::create_dir_all(&output.directory)
            .context(format!("Creating log directory {}", output.directory.display()))?;

        RollingFileAppender::builder()
            .rotation(output.rotation.clone())
            .filename_prefix(&self.name)
            .filename_suffix(LOG_FILE_SUFFIX)
            .max_log_files(output.max_files)
            .build(&output.directory)
            .context("Building rolling file appender")
    }
}

/// Handle to the installed logging system.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Starts a builder; `name` tags the logs and prefixes log file names.
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder {
            name: name.into(),
            level: LevelFilter::INFO,
            filter: None,
            console: true,
            json: false,
            file: None,
        }
    }

    /// Whether a file writer is attached.
    #[must_use]
    pub const fn writes_files(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}
