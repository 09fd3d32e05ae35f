use anyhow::{Context, Result};
use clap::Parser;
use prewarm_config::{ConfigLoader, LogLevel};
use prewarm_logging::{init_logging_from_config, init_simple_tracing};
use std::str::FromStr;
use tracing::debug;

mod cli;
mod commands;

use cli::{Cli, Commands, RunArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config tools work without a loadable configuration
    if let Some(Commands::Config { config_cmd }) = &cli.command {
        init_simple_tracing(cli.log_level.as_deref().unwrap_or("warn"))?;
        return commands::config::handle(config_cmd);
    }

    let mut config = ConfigLoader::new()
        .load_unvalidated(cli.config.as_ref())
        .context("Failed to load configuration")?;

    if let Some(level) = &cli.log_level {
        config.logging.level = LogLevel::from_str(level).map_err(anyhow::Error::msg)?;
    }
    init_logging_from_config(&config.logging)?;
    debug!("POP prewarm {} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(Commands::Resolve { probe }) => commands::resolve::execute(config, &probe).await,
        Some(Commands::Run(args)) => commands::run::execute(config, &args).await,
        None => commands::run::execute(config, &RunArgs::default()).await,
        Some(Commands::Config { .. }) => Ok(()),
    }
}
