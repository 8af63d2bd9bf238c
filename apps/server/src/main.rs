use anyhow::Context;
use folio::domain::config::{ApiConfig, LoggingConfig};
use folio::kernel::config::load_config;
use folio_logger::{FileOutput, LevelFilter, Logger};
use folio_server::Server;

fn init_logging(cfg: &LoggingConfig) -> anyhow::Result<Logger> {
    let level: LevelFilter = cfg.level.parse().with_context(|| format!("Invalid log level `{}`", cfg.level))?;

    let mut builder = Logger::builder(env!("CARGO_PKG_NAME")).console(cfg.console).json(cfg.json).level(level);
    if let Some(filter) = &cfg.filter {
        builder = builder.filter(filter);
    }
    if let Some(directory) = &cfg.directory {
        builder = builder.file(FileOutput::new(directory).max_files(cfg.max_files));
    }

    Ok(builder.init()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg: ApiConfig = load_config(Some("server")).context("Critical: Configuration is malformed")?;

    let _log = init_logging(&cfg.logging)?;

    Server::builder().config(cfg).build()?.run().await
}
