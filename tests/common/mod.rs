//! Loopback "edge" servers shared by the integration tests

#![allow(dead_code)]

use axum::extract::State;
use axum::http::{header::HOST, HeaderMap};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use prewarm_core::{Distribution, PopCode};
use prewarm_dns::StaticResolver;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const DISTRIBUTION_ID: &str = "d111111abcdef8";

#[derive(Clone)]
struct EdgeState {
    name: &'static str,
    hits: Arc<AtomicUsize>,
}

/// A local HTTP server standing in for one edge node
pub struct EdgeServer {
    pub name: &'static str,
    pub addr: SocketAddr,
    pub hits: Arc<AtomicUsize>,
}

impl EdgeServer {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn asset(State(state): State<EdgeState>, headers: HeaderMap) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    (
        [("x-amz-cf-pop", state.name)],
        Json(json!({ "edge": state.name, "host": host })),
    )
}

async fn slow(State(state): State<EdgeState>) -> &'static str {
    state.hits.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(30)).await;
    "late"
}

/// Start an edge server on `bind` (e.g. `127.0.0.1:0`).
///
/// Returns `None` when the address cannot be bound, so tests relying on
/// extra loopback addresses can skip on platforms without them.
pub async fn spawn_edge(name: &'static str, bind: &str) -> Option<EdgeServer> {
    let listener = match tokio::net::TcpListener::bind(bind).await {
        Ok(listener) => listener,
        Err(e) => {
            println!("⚠️ Could not bind {}: {}", bind, e);
            return None;
        }
    };
    let addr = listener.local_addr().ok()?;
    let hits = Arc::new(AtomicUsize::new(0));
    let state = EdgeState {
        name,
        hits: hits.clone(),
    };
    let app = Router::new()
        .route("/asset", get(asset))
        .route("/slow", get(slow))
        .with_state(state);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Some(EdgeServer { name, addr, hits })
}

pub fn pop(code: &str) -> PopCode {
    PopCode::new(code).expect("valid POP code")
}

pub fn distribution() -> Distribution {
    Distribution::new(DISTRIBUTION_ID)
}

/// Resolver answering the probe hostnames of `pops` with the edge's address
pub fn resolver_for(pops: &[&str], edge: &EdgeServer) -> StaticResolver {
    let dist = distribution();
    let mut resolver = StaticResolver::new();
    for code in pops {
        resolver.insert(dist.probe_host(&pop(code)), edge.addr.ip());
    }
    resolver
}
