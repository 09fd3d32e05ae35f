//! Full runs through the real forced-IP fetcher

mod common;

use anyhow::Result;
use common::{distribution, pop, resolver_for, spawn_edge};
use prewarm_core::FailureKind;
use prewarm_execution::{Orchestrator, OrchestratorConfig, RunRequest};
use prewarm_http::{FetchConfig, ForcedIpFetcher};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn request(pops: &[&str], n: u32, path: &str) -> RunRequest {
    RunRequest::new(distribution(), pops.iter().map(|p| pop(p)).collect(), n, path)
}

#[tokio::test]
async fn test_two_pops_two_requests_each() -> Result<()> {
    let edge = spawn_edge("EDGE1", "127.0.0.1:0").await.expect("bind 127.0.0.1");
    let orchestrator = Orchestrator::new(
        Arc::new(resolver_for(&["lhr", "jfk"], &edge)),
        Arc::new(ForcedIpFetcher::new(FetchConfig::plain_http(edge.addr.port()))),
        OrchestratorConfig::default(),
    );

    let (results, summary) = orchestrator
        .run(request(&["lhr", "jfk"], 2, "/asset"), CancellationToken::new())
        .collect()
        .await?;

    assert_eq!(results.len(), 4);
    assert_eq!(results.iter().filter(|r| r.pop == pop("lhr")).count(), 2);
    assert_eq!(results.iter().filter(|r| r.pop == pop("jfk")).count(), 2);
    assert!(results.iter().all(|r| r.status == 200));
    assert!(results.iter().all(|r| r.metrics.dns_lookup.is_some()));
    assert!(results.iter().all(|r| r.metrics.connect.is_some()));
    assert_eq!(edge.hits(), 4);
    assert!(summary.is_complete());
    Ok(())
}

#[tokio::test]
async fn test_unresolved_pop_contributes_no_results() -> Result<()> {
    let edge = spawn_edge("EDGE1", "127.0.0.1:0").await.expect("bind 127.0.0.1");
    let orchestrator = Orchestrator::new(
        Arc::new(resolver_for(&["lhr"], &edge)),
        Arc::new(ForcedIpFetcher::new(FetchConfig::plain_http(edge.addr.port()))),
        OrchestratorConfig::default(),
    );

    let (results, summary) = orchestrator
        .run(request(&["lhr", "jfk"], 2, "/asset"), CancellationToken::new())
        .collect()
        .await?;

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.pop == pop("lhr")));
    assert_eq!(summary.failures_of(FailureKind::Unresolved), 2);
    assert_eq!(summary.launched, 4);
    assert_eq!(edge.hits(), 2);
    Ok(())
}

#[tokio::test]
async fn test_zero_requests_closes_immediately() -> Result<()> {
    let edge = spawn_edge("EDGE1", "127.0.0.1:0").await.expect("bind 127.0.0.1");
    let orchestrator = Orchestrator::new(
        Arc::new(resolver_for(&["lhr"], &edge)),
        Arc::new(ForcedIpFetcher::new(FetchConfig::plain_http(edge.addr.port()))),
        OrchestratorConfig::default(),
    );

    let (results, summary) = orchestrator
        .run(request(&["lhr", "jfk"], 0, "/asset"), CancellationToken::new())
        .collect()
        .await?;

    assert!(results.is_empty());
    assert_eq!(summary.launched, 0);
    assert_eq!(edge.hits(), 0);
    Ok(())
}

#[tokio::test]
async fn test_cancel_mid_batch() -> Result<()> {
    let edge = spawn_edge("EDGE1", "127.0.0.1:0").await.expect("bind 127.0.0.1");
    let orchestrator = Orchestrator::new(
        Arc::new(resolver_for(&["lhr", "jfk"], &edge)),
        Arc::new(ForcedIpFetcher::new(FetchConfig::plain_http(edge.addr.port()))),
        OrchestratorConfig::default().with_max_concurrent_fetches(2),
    );
    let cancel = CancellationToken::new();
    let handle = orchestrator.run(request(&["lhr", "jfk"], 5, "/slow"), cancel.clone());

    // Wait for the first fetches to reach the server
    for _ in 0..100 {
        if edge.hits() >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cancel.cancel();

    let (results, summary) = tokio::time::timeout(Duration::from_secs(5), handle.collect()).await??;
    assert!(results.is_empty());
    assert!(summary.cancelled);
    assert_eq!(summary.failures_of(FailureKind::Cancelled), 10);
    assert_eq!(summary.launched, 2);
    Ok(())
}

#[tokio::test]
async fn test_transport_failures_are_counted() -> Result<()> {
    // Find a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let closed_port = listener.local_addr()?.port();
    drop(listener);

    let edge = spawn_edge("EDGE1", "127.0.0.1:0").await.expect("bind 127.0.0.1");
    let orchestrator = Orchestrator::new(
        Arc::new(resolver_for(&["lhr"], &edge)),
        Arc::new(ForcedIpFetcher::new(FetchConfig::plain_http(closed_port))),
        OrchestratorConfig::default(),
    );

    let (results, summary) = orchestrator
        .run(request(&["lhr"], 3, "/asset"), CancellationToken::new())
        .collect()
        .await?;

    assert!(results.is_empty());
    assert_eq!(summary.failures_of(FailureKind::Transport), 3);
    Ok(())
}
