//! Resolve-then-fan-out run driver

use crate::config::OrchestratorConfig;
use crate::error::ExecutionResult;
use crate::request::RunRequest;
use crate::summary::RunSummary;
use prewarm_core::{FailureKind, FetchResult};
use prewarm_dns::{resolve_all, PopResolver};
use prewarm_http::{FetchTarget, PopFetcher};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

/// How long in-flight fetches get to honour cancellation before they are
/// aborted outright
const CANCEL_GRACE: Duration = Duration::from_secs(5);

/// Runs prewarm batches against a resolver and a fetcher
#[derive(Clone)]
pub struct Orchestrator {
    resolver: Arc<dyn PopResolver>,
    fetcher: Arc<dyn PopFetcher>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        resolver: Arc<dyn PopResolver>,
        fetcher: Arc<dyn PopFetcher>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            config,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Start a run and return immediately.
    ///
    /// Must be called from within a Tokio runtime. The run stops admitting
    /// fetches and winds down in-flight work when `cancel` fires; the result
    /// stream closes either way once every task has terminated.
    pub fn run(&self, request: RunRequest, cancel: CancellationToken) -> RunHandle {
        let (results, receiver) = mpsc::channel(self.config.result_buffer.max(1));
        let run_cancel = cancel.child_token();

        let span = info_span!(
            "prewarm-run",
            distribution = %request.distribution.id(),
            pops = request.pops.len(),
            requests_per_pop = request.requests_per_pop,
        );

        let driver = RunDriver {
            resolver: Arc::clone(&self.resolver),
            fetcher: Arc::clone(&self.fetcher),
            config: self.config.clone(),
            request,
            cancel: run_cancel.clone(),
            results,
        };
        let summary = tokio::spawn(driver.drive().instrument(span));

        RunHandle {
            results: receiver,
            summary,
            cancel: run_cancel,
        }
    }
}

/// Consumer side of a run
pub struct RunHandle {
    results: mpsc::Receiver<FetchResult>,
    summary: JoinHandle<RunSummary>,
    cancel: CancellationToken,
}

impl RunHandle {
    /// Next result in completion order; `None` once the run is over
    pub async fn next(&mut self) -> Option<FetchResult> {
        self.results.recv().await
    }

    /// Cancel this run only
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Drain every result and wait for the summary
    pub async fn collect(mut self) -> ExecutionResult<(Vec<FetchResult>, RunSummary)> {
        let mut collected = Vec::new();
        while let Some(result) = self.results.recv().await {
            collected.push(result);
        }
        let summary = self.summary.await?;
        Ok((collected, summary))
    }

    /// Stop accepting results and wait for the summary.
    ///
    /// Fetches still running complete normally but their results are
    /// counted as undelivered.
    pub async fn finish(mut self) -> ExecutionResult<RunSummary> {
        self.results.close();
        while self.results.recv().await.is_some() {}
        Ok(self.summary.await?)
    }

    /// Split into a result stream and the summary task.
    ///
    /// Drain the stream before awaiting the summary: once `result_buffer`
    /// results are pending, fetch tasks wait on the stream while holding
    /// their permits, and the summary never completes.
    pub fn into_parts(self) -> (ReceiverStream<FetchResult>, JoinHandle<RunSummary>) {
        (ReceiverStream::new(self.results), self.summary)
    }
}

/// How a single admitted attempt ended
enum AttemptOutcome {
    Delivered,
    Undelivered,
    Failed(FailureKind),
}

struct RunDriver {
    resolver: Arc<dyn PopResolver>,
    fetcher: Arc<dyn PopFetcher>,
    config: OrchestratorConfig,
    request: RunRequest,
    cancel: CancellationToken,
    results: mpsc::Sender<FetchResult>,
}

impl RunDriver {
    async fn drive(self) -> RunSummary {
        let started = Instant::now();
        let finished = CancellationToken::new();
        let _finished_guard = finished.clone().drop_guard();
        if let Some(deadline) = self.config.run_deadline {
            spawn_deadline(deadline, self.cancel.clone(), finished.clone());
        }

        let request = &self.request;
        let mut summary = RunSummary {
            expected: request.expected_fetches(),
            ..Default::default()
        };

        // Phase 1: every lookup joins before any fetch starts
        let report = resolve_all(
            Arc::clone(&self.resolver),
            &request.distribution,
            &request.pops,
            self.config.resolve_timeout,
            &self.cancel,
        )
        .await;
        summary.pops_resolved = report.map.len();
        summary.pops_requested = report.map.len() + report.failures.len();
        summary.resolution_failures = report
            .failures
            .iter()
            .map(|(pop, e)| (pop.clone(), e.to_string()))
            .collect();

        // Phase 2: semaphore-gated fan-out
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_fetches.max(1)));
        let logical_host = request.distribution.logical_host();
        let mut tasks = JoinSet::new();

        'admission: for pop in &request.pops {
            let resolved = report.map.get(pop);
            for _ in 0..request.requests_per_pop {
                let permit = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => break 'admission,
                    permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => break 'admission,
                    },
                };

                // An unresolved POP keeps its empty address and fails in the fetcher
                let target = FetchTarget::new(
                    pop.clone(),
                    report.map.ip_string(pop),
                    logical_host.clone(),
                    request.path.clone(),
                )
                .with_dns_lookup(resolved.map(|r| r.lookup_time));
                let fetcher = Arc::clone(&self.fetcher);
                let cancel = self.cancel.clone();
                let results = self.results.clone();

                tasks.spawn(
                    async move {
                        let _permit = permit;
                        attempt(fetcher.as_ref(), &target, &cancel, &results).await
                    }
                    .in_current_span(),
                );
                summary.launched += 1;

                while let Some(joined) = tasks.try_join_next() {
                    record_outcome(&mut summary, joined);
                }
            }
        }

        let not_admitted = summary.expected - summary.launched;
        if not_admitted > 0 {
            debug!("{} attempts never admitted", not_admitted);
            summary.record_failures(FailureKind::Cancelled, not_admitted);
        }

        let grace = async {
            self.cancel.cancelled().await;
            tokio::time::sleep(CANCEL_GRACE).await;
        };
        tokio::pin!(grace);
        let mut aborted = false;
        loop {
            tokio::select! {
                joined = tasks.join_next() => match joined {
                    Some(joined) => record_outcome(&mut summary, joined),
                    None => break,
                },
                _ = &mut grace, if !aborted => {
                    warn!("{} fetches ignored cancellation, aborting", tasks.len());
                    tasks.abort_all();
                    aborted = true;
                }
            }
        }

        summary.cancelled = self.cancel.is_cancelled();
        summary.elapsed = started.elapsed();

        info!(
            "Run finished: expected {}, succeeded {}, failed {} ({:?}), resolved {}/{} POPs in {:?}",
            summary.expected,
            summary.succeeded,
            summary.failed(),
            summary.failures,
            summary.pops_resolved,
            summary.pops_requested,
            summary.elapsed
        );
        summary
    }
}

async fn attempt(
    fetcher: &dyn PopFetcher,
    target: &FetchTarget,
    cancel: &CancellationToken,
    results: &mpsc::Sender<FetchResult>,
) -> AttemptOutcome {
    match fetcher.fetch(target, cancel).await {
        Ok(result) => {
            tokio::select! {
                sent = results.send(result) => match sent {
                    Ok(()) => AttemptOutcome::Delivered,
                    Err(_) => {
                        debug!("Result stream closed, dropping result for {}", target.pop);
                        AttemptOutcome::Undelivered
                    }
                },
                _ = cancel.cancelled() => AttemptOutcome::Undelivered,
            }
        }
        Err(e) => {
            warn!("Fetch from POP {} failed: {}", target.pop, e);
            AttemptOutcome::Failed(e.kind())
        }
    }
}

fn record_outcome(summary: &mut RunSummary, joined: Result<AttemptOutcome, JoinError>) {
    match joined {
        Ok(AttemptOutcome::Delivered) => summary.succeeded += 1,
        Ok(AttemptOutcome::Undelivered) => summary.undelivered += 1,
        Ok(AttemptOutcome::Failed(kind)) => summary.record_failure(kind),
        Err(e) => {
            if e.is_panic() {
                warn!("Fetch task panicked: {}", e);
            }
            summary.record_failure(FailureKind::Aborted);
        }
    }
}

/// Cancel the run once `deadline` elapses, unless it finishes first
fn spawn_deadline(deadline: Duration, cancel: CancellationToken, finished: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(deadline) => {
                warn!("Run deadline of {:?} reached, cancelling", deadline);
                cancel.cancel();
            }
            _ = finished.cancelled() => {}
            _ = cancel.cancelled() => {}
        }
    });
}
