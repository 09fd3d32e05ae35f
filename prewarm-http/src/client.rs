//! Forced-IP fetch implementation

use crate::config::FetchConfig;
use crate::connect::ConnectTimer;
use crate::errors::FetchError;
use async_trait::async_trait;
use prewarm_config::HttpScheme;
use prewarm_core::{FetchResult, HeaderValues, PopCode, TimingMetrics};
use reqwest::{redirect::Policy, Client, Response};
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, Instrument};
use url::Url;

/// Fetcher trait for one request pinned to a POP address
#[async_trait]
pub trait PopFetcher: Send + Sync {
    /// Perform one GET against `target`, returning early with
    /// [`FetchError::Cancelled`] when `cancel` fires.
    async fn fetch(
        &self,
        target: &FetchTarget,
        cancel: &CancellationToken,
    ) -> Result<FetchResult, FetchError>;
}

/// What to fetch and where to dial
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTarget {
    pub pop: PopCode,

    /// Resolved POP address; empty when resolution failed
    pub ip: String,

    /// Hostname used in the URL, SNI and `Host`
    pub logical_host: String,

    pub path: String,

    /// Resolution time of the POP, copied into the timing record
    pub dns_lookup: Option<Duration>,
}

impl FetchTarget {
    pub fn new(
        pop: PopCode,
        ip: impl Into<String>,
        logical_host: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            pop,
            ip: ip.into(),
            logical_host: logical_host.into(),
            path: path.into(),
            dns_lookup: None,
        }
    }

    pub fn with_dns_lookup(mut self, dns_lookup: Option<Duration>) -> Self {
        self.dns_lookup = dns_lookup;
        self
    }

    fn parse_ip(&self) -> Result<IpAddr, FetchError> {
        let ip = self.ip.trim();
        if ip.is_empty() {
            return Err(FetchError::MissingAddress {
                pop: self.pop.clone(),
            });
        }
        ip.parse().map_err(|_| FetchError::InvalidAddress {
            pop: self.pop.clone(),
            ip: self.ip.clone(),
        })
    }
}

/// Build the request URL for the logical host.
///
/// The port is only spelled out when it differs from the scheme default,
/// which keeps `Host` equal to the bare hostname for real distributions.
pub fn fetch_url(scheme: HttpScheme, host: &str, port: u16, path: &str) -> Result<Url, FetchError> {
    if host.trim().is_empty() {
        return Err(FetchError::Request("logical host is empty".to_string()));
    }
    if !path.starts_with('/') {
        return Err(FetchError::Request(format!(
            "path must start with '/': {:?}",
            path
        )));
    }

    let authority = if port == scheme.default_port() {
        host.to_string()
    } else {
        format!("{}:{}", host, port)
    };

    Url::parse(&format!("{}://{}{}", scheme, authority, path))
        .map_err(|e| FetchError::Request(format!("invalid URL for {}{}: {}", host, path, e)))
}

/// Fetcher that dials the target IP while addressing the logical host.
///
/// Every fetch gets its own client, so every fetch pays for its own dial
/// and TLS handshake against the POP.
#[derive(Debug, Clone, Default)]
pub struct ForcedIpFetcher {
    config: FetchConfig,
}

impl ForcedIpFetcher {
    pub fn new(config: FetchConfig) -> Self {
        debug!(
            "Creating ForcedIpFetcher ({} port {}, request timeout {:?})",
            config.scheme, config.port, config.request_timeout
        );
        Self { config }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn build_client(
        &self,
        logical_host: &str,
        addr: SocketAddr,
        timer: &ConnectTimer,
    ) -> Result<Client, FetchError> {
        Client::builder()
            // Name resolution of the logical host is replaced by the POP address
            .resolve(logical_host, addr)
            .no_proxy()
            .redirect(Policy::none())
            .connect_timeout(self.config.connect_timeout)
            .timeout(self.config.request_timeout)
            .tcp_keepalive(self.config.tcp_keepalive)
            .user_agent(&self.config.user_agent)
            .danger_accept_invalid_certs(!self.config.verify_tls)
            .connector_layer(timer.clone())
            .build()
            .map_err(FetchError::Client)
    }

    async fn fetch_pinned(&self, target: &FetchTarget) -> Result<FetchResult, FetchError> {
        let ip = target.parse_ip()?;
        let url = fetch_url(
            self.config.scheme,
            &target.logical_host,
            self.config.port,
            &target.path,
        )?;
        let timer = ConnectTimer::new();
        let client = self.build_client(
            &target.logical_host,
            SocketAddr::new(ip, self.config.port),
            &timer,
        )?;

        let started = Instant::now();
        let mut response = client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_send_error(&url, e, started))?;
        let ttfb = started.elapsed();

        let status = response.status().as_u16();
        let headers = collect_headers(&response);

        let mut body = Vec::new();
        let mut first_chunk = None;
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    if first_chunk.is_none() {
                        first_chunk = Some(started.elapsed());
                    }
                    body.extend_from_slice(&chunk);
                }
                Ok(None) => break,
                Err(e) if e.is_timeout() => {
                    return Err(FetchError::Timeout {
                        url: url.to_string(),
                        elapsed: started.elapsed(),
                    })
                }
                Err(source) => {
                    return Err(FetchError::Body {
                        url: url.to_string(),
                        source,
                    })
                }
            }
        }
        let end_time = started.elapsed();

        debug!(
            "Fetched {} via {}: {} ({} bytes) in {:?}",
            url,
            ip,
            status,
            body.len(),
            end_time
        );

        Ok(FetchResult {
            pop: target.pop.clone(),
            ip,
            logical_host: target.logical_host.clone(),
            status,
            metrics: TimingMetrics {
                ttfb: Some(ttfb),
                first_chunk,
                end_time,
                dns_lookup: target.dns_lookup,
                connect: timer.elapsed(),
            },
            headers,
            body,
        })
    }
}

#[async_trait]
impl PopFetcher for ForcedIpFetcher {
    async fn fetch(
        &self,
        target: &FetchTarget,
        cancel: &CancellationToken,
    ) -> Result<FetchResult, FetchError> {
        let span = info_span!("fetch-pop", pop = %target.pop, ip = %target.ip);
        async {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(FetchError::Cancelled),
                result = self.fetch_pinned(target) => result,
            }
        }
        .instrument(span)
        .await
    }
}

fn classify_send_error(url: &Url, error: reqwest::Error, started: Instant) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            elapsed: started.elapsed(),
        }
    } else if error.is_builder() {
        FetchError::Request(error.to_string())
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}

fn collect_headers(response: &Response) -> HeaderValues {
    let mut headers = HeaderValues::new();
    for (name, value) in response.headers() {
        headers
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    headers
}
