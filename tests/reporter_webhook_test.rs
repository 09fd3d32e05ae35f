//! Run results reported through the webhook sink

mod common;

use anyhow::Result;
use common::{distribution, pop, resolver_for, spawn_edge};
use prewarm_execution::{Orchestrator, OrchestratorConfig, RunRequest};
use prewarm_http::{FetchConfig, ForcedIpFetcher};
use prewarm_output::{Reporter, WebhookSink};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn run_and_report(webhook_url: &str) -> Result<(prewarm_output::ReportSummary, usize)> {
    let edge = spawn_edge("EDGE1", "127.0.0.1:0").await.expect("bind 127.0.0.1");
    let orchestrator = Orchestrator::new(
        Arc::new(resolver_for(&["lhr", "jfk", "fra"], &edge)),
        Arc::new(ForcedIpFetcher::new(FetchConfig::plain_http(edge.addr.port()))),
        OrchestratorConfig::default(),
    );
    let request = RunRequest::new(
        distribution(),
        vec![pop("lhr"), pop("jfk"), pop("fra")],
        2,
        "/asset",
    );

    let sink = WebhookSink::new(webhook_url, Duration::from_secs(5), HashMap::new())?;
    let reporter = Reporter::new(Arc::new(sink), "CustomCloudFrontMetrics");

    let mut handle = orchestrator.run(request, CancellationToken::new());
    let summary = reporter.report(&mut handle).await;
    let run = handle.finish().await?;
    assert!(run.is_complete());

    Ok((summary, edge.hits()))
}

#[tokio::test]
async fn test_one_post_per_fetch_result() -> Result<()> {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/metrics"))
        .and(body_partial_json(serde_json::json!({
            "namespace": "CustomCloudFrontMetrics",
            "name": "ResponseTime",
            "unit": "Milliseconds"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(6)
        .mount(&mock_server)
        .await;

    let url = format!("{}/metrics", mock_server.uri());
    let (summary, hits) = run_and_report(&url).await?;

    assert_eq!(hits, 6);
    assert_eq!(summary.published, 6);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.pops.len(), 3);
    assert!(summary.pops.values().all(|stats| stats.count == 2));

    // Every observation carries its POP dimension
    let requests = mock_server.received_requests().await.unwrap_or_default();
    let mut pops: Vec<String> = requests
        .iter()
        .filter_map(|r| serde_json::from_slice::<Value>(&r.body).ok())
        .filter_map(|body| body["dimensions"]["POP"].as_str().map(str::to_string))
        .collect();
    pops.sort();
    assert_eq!(pops, vec!["fra", "fra", "jfk", "jfk", "lhr", "lhr"]);

    Ok(())
}

#[tokio::test]
async fn test_webhook_errors_do_not_stop_reporting() -> Result<()> {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(500).set_body_string("unavailable"))
        .expect(6)
        .mount(&mock_server)
        .await;

    let url = format!("{}/metrics", mock_server.uri());
    let (summary, hits) = run_and_report(&url).await?;

    assert_eq!(hits, 6);
    assert_eq!(summary.published, 0);
    assert_eq!(summary.failed, 6);
    assert!(summary.pops.is_empty());

    Ok(())
}
