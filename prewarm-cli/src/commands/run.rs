//! `prewarm run`: resolve, fan out, report

use crate::cli::RunArgs;
use crate::commands::{apply_probe_args, build_resolver, interrupt_token};
use anyhow::{Context, Result};
use prewarm_config::PrewarmConfig;
use prewarm_execution::{Orchestrator, OrchestratorConfig, RunRequest, RunSummary};
use prewarm_http::{FetchConfig, ForcedIpFetcher};
use prewarm_output::{build_sink, Reporter};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Fold run flags into the configuration
pub fn apply_run_args(config: &mut PrewarmConfig, args: &RunArgs) {
    apply_probe_args(config, &args.probe);
    if let Some(max) = args.max_concurrency {
        config.execution.max_concurrent_fetches = max;
    }
    if let Some(every) = args.every {
        config.schedule.interval = Some(Duration::from_secs(every));
    }
    if let Some(max_runs) = args.max_runs {
        config.schedule.max_runs = Some(max_runs);
    }
    if args.insecure {
        config.http.verify_tls = false;
    }
}

pub async fn execute(mut config: PrewarmConfig, args: &RunArgs) -> Result<()> {
    apply_run_args(&mut config, args);
    config.validate_all().context("Invalid configuration")?;

    let request = RunRequest::from_probe(&config.probe)?;

    // Reporting must be available before anything is fetched
    let sink = build_sink(&config.output).context("Failed to set up metric sink")?;
    let reporter = Reporter::from_config(sink, &config.output);

    let orchestrator = Orchestrator::new(
        build_resolver(&args.probe.resolve),
        Arc::new(ForcedIpFetcher::new(FetchConfig::from(config.http.clone()))),
        OrchestratorConfig::from(config.execution.clone()),
    );

    let shutdown = interrupt_token();

    info!(
        "Prewarming {} via {} POPs, {} requests each",
        request.distribution.logical_host(),
        request.pops.len(),
        request.requests_per_pop
    );

    let Some(interval) = config.schedule.interval else {
        run_once(&orchestrator, &reporter, request, &shutdown).await?;
        return Ok(());
    };

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut runs: u32 = 0;
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        runs += 1;
        info!("Starting run {}", runs);
        if let Err(e) = run_once(&orchestrator, &reporter, request.clone(), &shutdown).await {
            error!("Run {} failed: {:#}", runs, e);
        }

        if config.schedule.max_runs.is_some_and(|max| runs >= max) {
            info!("Reached {} runs, stopping", runs);
            break;
        }
    }
    Ok(())
}

async fn run_once(
    orchestrator: &Orchestrator,
    reporter: &Reporter,
    request: RunRequest,
    shutdown: &CancellationToken,
) -> Result<RunSummary> {
    let mut handle = orchestrator.run(request, shutdown.child_token());
    reporter.report(&mut handle).await;
    let summary = handle.finish().await.context("Run did not complete")?;

    if summary.cancelled {
        warn!("Run was cancelled before completing");
    }
    info!(
        "Run summary: {}",
        serde_json::to_string(&summary).unwrap_or_else(|e| format!("<unserializable: {}>", e))
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_run_args() {
        let mut config = PrewarmConfig::default();
        let args = RunArgs {
            max_concurrency: Some(4),
            every: Some(60),
            max_runs: Some(2),
            insecure: true,
            ..Default::default()
        };
        apply_run_args(&mut config, &args);

        assert_eq!(config.execution.max_concurrent_fetches, 4);
        assert_eq!(config.schedule.interval, Some(Duration::from_secs(60)));
        assert_eq!(config.schedule.max_runs, Some(2));
        assert!(!config.http.verify_tls);
    }
}
