use anyhow::{Context, Result};
use cli::{Cli, Command};
use std::path::Path;
use std::time::Duration;
use trawl_common::observability::{LogConfig, init_logging};
use trawl_config::{TrawlConfig, TrawlConfigLoader};
use trawl_web::ReaderClient;

mod cli;
mod commands;

#[tokio::main]
async fn main() -> Result<()> {
    // Usage errors exit with status 2 before any config or network work.
    let cli = Cli::parse_args();

    match cli.command {
        Command::Search(args) => {
            let query = args.search_query().unwrap_or_else(|e| e.exit());
            let (cfg, client) = bootstrap(cli.config.as_deref(), cli.verbose)?;
            let mut out = std::io::stdout().lock();
            commands::search(&client, &cfg, &query, &args, &mut out).await
        }
        Command::Read(args) => {
            let (_, client) = bootstrap(cli.config.as_deref(), cli.verbose)?;
            let mut out = std::io::stdout().lock();
            commands::read(&client, &args, &mut out).await
        }
    }
}

/// Load config, start logging and build the reader client.
fn bootstrap(config_path: Option<&Path>, verbose: bool) -> Result<(TrawlConfig, ReaderClient)> {
    let loader = match config_path {
        Some(path) => TrawlConfigLoader::new().with_file(path),
        None => TrawlConfigLoader::new().with_default_file(),
    };
    let cfg = loader.load().context("failed to load configuration")?;

    let log_path = init_logging(LogConfig {
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: verbose,
        format: cfg.logging.format,
        default_filter: cfg.logging.filter.clone(),
        ..LogConfig::default()
    })?;
    tracing::debug!(target: "trawl", log_path = %log_path.display(), "logging.ready");

    let client = ReaderClient::new(
        &cfg.reader.base_url,
        &cfg.search.engine_url,
        Duration::from_secs(cfg.reader.timeout_secs),
    )
    .context("invalid reader configuration")?;

    Ok((cfg, client))
}
