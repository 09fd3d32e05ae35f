//! Hostname lookup backends

use async_trait::async_trait;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

/// Looks up the addresses of a hostname
#[async_trait]
pub trait PopResolver: Send + Sync {
    /// Return every address the name resolves to, in resolver order.
    /// An empty list is a valid answer and is reported by the caller.
    async fn lookup(&self, host: &str) -> std::io::Result<Vec<IpAddr>>;
}

/// Platform resolver (`getaddrinfo` on a blocking thread)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl SystemResolver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PopResolver for SystemResolver {
    async fn lookup(&self, host: &str) -> std::io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 0u16)).await?;
        let mut ips: Vec<IpAddr> = Vec::new();
        for addr in addrs {
            // getaddrinfo repeats an address once per socket type
            if !ips.contains(&addr.ip()) {
                ips.push(addr.ip());
            }
        }
        debug!("{} resolved to {:?}", host, ips);
        Ok(ips)
    }
}

/// Fixed host table, optionally falling back to another resolver.
///
/// Used for `--resolve` pins and for driving runs against local endpoints.
#[derive(Clone, Default)]
pub struct StaticResolver {
    entries: HashMap<String, Vec<IpAddr>>,
    fallback: Option<Arc<dyn PopResolver>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an address for a host; repeated calls append
    pub fn with_host(mut self, host: impl Into<String>, ip: IpAddr) -> Self {
        self.insert(host, ip);
        self
    }

    pub fn insert(&mut self, host: impl Into<String>, ip: IpAddr) {
        self.entries
            .entry(host.into().to_ascii_lowercase())
            .or_default()
            .push(ip);
    }

    /// Resolver consulted for hosts missing from the table
    pub fn with_fallback(mut self, fallback: Arc<dyn PopResolver>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for StaticResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticResolver")
            .field("entries", &self.entries)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

#[async_trait]
impl PopResolver for StaticResolver {
    async fn lookup(&self, host: &str) -> std::io::Result<Vec<IpAddr>> {
        if let Some(ips) = self.entries.get(&host.to_ascii_lowercase()) {
            return Ok(ips.clone());
        }
        match &self.fallback {
            Some(fallback) => fallback.lookup(host).await,
            None => Ok(Vec::new()),
        }
    }
}
