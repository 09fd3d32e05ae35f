//! `prewarm resolve`: phase one only

use crate::cli::ProbeArgs;
use crate::commands::{apply_probe_args, build_resolver, interrupt_token};
use anyhow::{Context, Result};
use prewarm_config::{PrewarmConfig, Validatable};
use prewarm_dns::{resolve_all, ResolutionReport};
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;

pub async fn execute(config: PrewarmConfig, args: &ProbeArgs) -> Result<()> {
    let cancel = interrupt_token();
    let (config, report) = resolve_report(config, args, &cancel).await?;

    let distribution = config.probe.distribution();
    let pops = config.probe.pops.codes()?;

    let mut printed = HashSet::new();
    for pop in &pops {
        if !printed.insert(pop) {
            continue;
        }
        if let Some(resolved) = report.map.get(pop) {
            println!(
                "{}\t{}\t{}\t{} ms",
                pop,
                distribution.probe_host(pop),
                resolved.ip,
                resolved.lookup_time.as_millis()
            );
        }
    }
    for (pop, e) in report.sorted_failures() {
        println!("{}\t{}\t-\t{}", pop, distribution.probe_host(pop), e);
    }

    if report.map.is_empty() && !pops.is_empty() {
        anyhow::bail!("No POP could be resolved");
    }
    Ok(())
}

/// Apply the flags, validate and resolve every configured POP
async fn resolve_report(
    mut config: PrewarmConfig,
    args: &ProbeArgs,
    cancel: &CancellationToken,
) -> Result<(PrewarmConfig, ResolutionReport)> {
    apply_probe_args(&mut config, args);
    config.probe.validate().context("Invalid probe configuration")?;

    let pops = config.probe.pops.codes()?;
    let report = resolve_all(
        build_resolver(&args.resolve),
        &config.probe.distribution(),
        &pops,
        config.execution.resolve_timeout,
        cancel,
    )
    .await;
    Ok((config, report))
}
