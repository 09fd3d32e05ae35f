//! `prewarm config` subcommands

use crate::cli::ConfigCommands;
use anyhow::{Context, Result};
use prewarm_config::{ConfigLoader, PrewarmConfig};
use std::path::Path;

pub fn handle(cmd: &ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Validate { config_file } => validate(config_file),
        ConfigCommands::Generate { output, force } => generate(output.as_deref(), *force),
    }
}

fn validate(config_file: &Path) -> Result<()> {
    let config = ConfigLoader::new()
        .from_file(config_file)
        .with_context(|| format!("Invalid configuration: {}", config_file.display()))?;

    println!("Configuration is valid: {}", config_file.display());
    println!(
        "  distribution: {} (logical host {})",
        config.probe.distribution_id,
        config.probe.distribution().logical_host()
    );
    println!(
        "  pops: {} x {} requests",
        config.probe.pops.len(),
        config.probe.requests_per_pop
    );
    Ok(())
}

fn generate(output: Option<&Path>, force: bool) -> Result<()> {
    let sample = PrewarmConfig::generate_sample();
    match output {
        None => {
            print!("{}", sample);
            Ok(())
        }
        Some(path) => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists, use --force to overwrite",
                    path.display()
                );
            }
            std::fs::write(path, sample)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote default configuration to {}", path.display());
            Ok(())
        }
    }
}
