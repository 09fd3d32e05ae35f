//! Concurrent resolution of every POP in a run

use crate::errors::ResolutionError;
use crate::resolver::PopResolver;
use prewarm_core::{Distribution, PopCode};
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::{Id, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, instrument, warn, Instrument};

/// Successful resolution of one POP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPop {
    pub ip: IpAddr,
    pub lookup_time: Duration,
}

/// POP to address mapping for one run.
///
/// A POP missing from the map failed resolution.
#[derive(Debug, Clone, Default)]
pub struct PopIpMap {
    entries: HashMap<PopCode, ResolvedPop>,
}

impl PopIpMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pop: PopCode, resolved: ResolvedPop) {
        self.entries.insert(pop, resolved);
    }

    pub fn get(&self, pop: &PopCode) -> Option<&ResolvedPop> {
        self.entries.get(pop)
    }

    pub fn contains(&self, pop: &PopCode) -> bool {
        self.entries.contains_key(pop)
    }

    /// Address as handed to the fetcher; empty when the POP is unresolved
    pub fn ip_string(&self, pop: &PopCode) -> String {
        self.entries
            .get(pop)
            .map(|resolved| resolved.ip.to_string())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PopCode, &ResolvedPop)> {
        self.entries.iter()
    }
}

impl FromIterator<(PopCode, ResolvedPop)> for PopIpMap {
    fn from_iter<T: IntoIterator<Item = (PopCode, ResolvedPop)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Outcome of resolving a batch of POPs
#[derive(Debug, Default)]
pub struct ResolutionReport {
    pub map: PopIpMap,
    pub failures: Vec<(PopCode, ResolutionError)>,
}

impl ResolutionReport {
    /// Failures sorted by POP for stable output
    pub fn sorted_failures(&self) -> Vec<&(PopCode, ResolutionError)> {
        let mut failures: Vec<_> = self.failures.iter().collect();
        failures.sort_by(|a, b| a.0.cmp(&b.0));
        failures
    }
}

/// Resolve the probe hostname of a single POP. The first address wins.
#[instrument(name = "dns-lookup", skip_all, fields(pop = %pop))]
pub async fn resolve_pop(
    resolver: &dyn PopResolver,
    distribution: &Distribution,
    pop: &PopCode,
    timeout: Duration,
) -> Result<ResolvedPop, ResolutionError> {
    let host = distribution.probe_host(pop);
    let started = Instant::now();

    let addrs = match tokio::time::timeout(timeout, resolver.lookup(&host)).await {
        Ok(Ok(addrs)) => addrs,
        Ok(Err(source)) => return Err(ResolutionError::Lookup { host, source }),
        Err(_) => return Err(ResolutionError::Timeout { host, timeout }),
    };

    let ip = addrs
        .first()
        .copied()
        .ok_or_else(|| ResolutionError::NoAddresses { host: host.clone() })?;
    let lookup_time = started.elapsed();

    debug!("{} -> {} in {:?}", host, ip, lookup_time);
    Ok(ResolvedPop { ip, lookup_time })
}

/// Resolve every POP concurrently, one task per distinct POP.
///
/// Results are gathered here as tasks complete, so the map has a single
/// writer. Individual failures are logged and recorded in the report.
/// When `cancel` fires, outstanding lookups are aborted and the POPs they
/// were serving are reported as [`ResolutionError::Cancelled`].
pub async fn resolve_all(
    resolver: Arc<dyn PopResolver>,
    distribution: &Distribution,
    pops: &[PopCode],
    timeout: Duration,
    cancel: &CancellationToken,
) -> ResolutionReport {
    let span = info_span!("dig-pops-ip", pops = pops.len());
    resolve_all_inner(resolver, distribution, pops, timeout, cancel)
        .instrument(span)
        .await
}

async fn resolve_all_inner(
    resolver: Arc<dyn PopResolver>,
    distribution: &Distribution,
    pops: &[PopCode],
    timeout: Duration,
    cancel: &CancellationToken,
) -> ResolutionReport {
    let mut report = ResolutionReport::default();
    let mut seen = HashSet::new();
    let mut pending: HashMap<Id, PopCode> = HashMap::new();
    let mut tasks = JoinSet::new();

    for pop in pops {
        if !seen.insert(pop.clone()) {
            continue;
        }
        let resolver = Arc::clone(&resolver);
        let distribution = distribution.clone();
        let task_pop = pop.clone();
        let handle = tasks.spawn(
            async move {
                let outcome =
                    resolve_pop(resolver.as_ref(), &distribution, &task_pop, timeout).await;
                (task_pop, outcome)
            }
            .in_current_span(),
        );
        pending.insert(handle.id(), pop.clone());
    }

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tasks.abort_all();
                let mut remaining: Vec<PopCode> = pending.drain().map(|(_, pop)| pop).collect();
                remaining.sort();
                for pop in remaining {
                    let host = distribution.probe_host(&pop);
                    warn!("Resolution of {} cancelled", pop);
                    report.failures.push((pop, ResolutionError::Cancelled { host }));
                }
                break;
            }
            joined = tasks.join_next_with_id() => match joined {
                None => break,
                Some(Ok((id, (pop, outcome)))) => {
                    pending.remove(&id);
                    match outcome {
                        Ok(resolved) => report.map.insert(pop, resolved),
                        Err(e) => {
                            warn!("Failed to resolve POP {}: {}", pop, e);
                            report.failures.push((pop, e));
                        }
                    }
                }
                Some(Err(join_error)) => {
                    if let Some(pop) = pending.remove(&join_error.id()) {
                        warn!("Resolution task for {} failed: {}", pop, join_error);
                        let host = distribution.probe_host(&pop);
                        report.failures.push((
                            pop,
                            ResolutionError::Lookup {
                                host,
                                source: std::io::Error::other(join_error.to_string()),
                            },
                        ));
                    }
                }
            }
        }
    }

    info!(
        "Resolved {}/{} POPs",
        report.map.len(),
        report.map.len() + report.failures.len()
    );
    report
}
