//! Drains a run's results into a metric sink

use crate::errors::ReportingError;
use crate::metric::{MetricDatum, RESPONSE_TIME_METRIC};
use crate::sinks::MetricSink;
use futures::{Stream, StreamExt};
use prewarm_config::OutputConfig;
use prewarm_core::{FetchResult, PopCode};
use prewarm_execution::RunHandle;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Latency statistics for one POP, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PopStats {
    pub count: u64,
    pub min_ms: u64,
    pub max_ms: u64,
    pub total_ms: u64,
}

impl PopStats {
    fn first(value: u64) -> Self {
        Self {
            count: 1,
            min_ms: value,
            max_ms: value,
            total_ms: value,
        }
    }

    fn record(&mut self, value: u64) {
        self.count += 1;
        self.min_ms = self.min_ms.min(value);
        self.max_ms = self.max_ms.max(value);
        self.total_ms += value;
    }

    pub fn mean_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_ms as f64 / self.count as f64
        }
    }
}

/// What happened while reporting one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportSummary {
    pub published: u64,
    pub failed: u64,
    pub pops: BTreeMap<PopCode, PopStats>,
}

impl ReportSummary {
    fn observe(&mut self, pop: &PopCode, value: u64) {
        match self.pops.get_mut(pop) {
            Some(stats) => stats.record(value),
            None => {
                self.pops.insert(pop.clone(), PopStats::first(value));
            }
        }
    }
}

/// Publishes one `ResponseTime` observation per fetch result
#[derive(Clone)]
pub struct Reporter {
    sink: Arc<dyn MetricSink>,
    namespace: String,
    metric_name: String,
}

impl Reporter {
    pub fn new(sink: Arc<dyn MetricSink>, namespace: impl Into<String>) -> Self {
        Self {
            sink,
            namespace: namespace.into(),
            metric_name: RESPONSE_TIME_METRIC.to_string(),
        }
    }

    pub fn from_config(sink: Arc<dyn MetricSink>, config: &OutputConfig) -> Self {
        Self::new(sink, config.namespace.clone()).with_metric_name(config.metric_name.clone())
    }

    pub fn with_metric_name(mut self, name: impl Into<String>) -> Self {
        self.metric_name = name.into();
        self
    }

    /// Publish the observation for a single result
    pub async fn publish(&self, result: &FetchResult) -> Result<MetricDatum, ReportingError> {
        let datum = MetricDatum::response_time(self.namespace.clone(), result)
            .with_name(self.metric_name.clone());
        self.sink.publish(&datum).await?;
        Ok(datum)
    }

    /// Drain a run's result stream until it closes
    pub async fn report(&self, handle: &mut RunHandle) -> ReportSummary {
        let mut summary = ReportSummary::default();
        while let Some(result) = handle.next().await {
            self.report_one(&mut summary, &result).await;
        }
        self.log_summary(&summary);
        summary
    }

    /// Drain any stream of results
    pub async fn report_stream<S>(&self, mut results: S) -> ReportSummary
    where
        S: Stream<Item = FetchResult> + Unpin,
    {
        let mut summary = ReportSummary::default();
        while let Some(result) = results.next().await {
            self.report_one(&mut summary, &result).await;
        }
        self.log_summary(&summary);
        summary
    }

    async fn report_one(&self, summary: &mut ReportSummary, result: &FetchResult) {
        match self.publish(result).await {
            Ok(datum) => {
                summary.published += 1;
                summary.observe(&result.pop, datum.value);
            }
            Err(e) => {
                warn!(
                    "Failed to publish {} for POP {} via {}: {}",
                    self.metric_name,
                    result.pop,
                    self.sink.sink_type(),
                    e
                );
                summary.failed += 1;
            }
        }
    }

    fn log_summary(&self, summary: &ReportSummary) {
        for (pop, stats) in &summary.pops {
            debug!(
                "POP {}: {} samples, min {} ms, mean {:.1} ms, max {} ms",
                pop,
                stats.count,
                stats.min_ms,
                stats.mean_ms(),
                stats.max_ms
            );
        }
        info!(
            "Reported {} observations to {} ({} failed)",
            summary.published,
            self.sink.sink_type(),
            summary.failed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use prewarm_core::{HeaderValues, TimingMetrics};
    use parking_lot::Mutex;
    use std::time::Duration;

    /// Records data and rejects every other publish
    #[derive(Default)]
    struct FlakySink {
        seen: Mutex<Vec<MetricDatum>>,
    }

    #[async_trait]
    impl MetricSink for FlakySink {
        async fn publish(&self, datum: &MetricDatum) -> Result<(), ReportingError> {
            let mut seen = self.seen.lock();
            seen.push(datum.clone());
            if seen.len() % 2 == 0 {
                return Err(ReportingError::Network {
                    url: "memory".to_string(),
                    error: "dropped".to_string(),
                });
            }
            Ok(())
        }

        fn sink_type(&self) -> &'static str {
            "memory"
        }
    }

    fn result(pop: &str, ms: u64) -> FetchResult {
        FetchResult {
            pop: PopCode::new(pop).unwrap(),
            ip: "192.0.2.1".parse().unwrap(),
            logical_host: "d1.cloudfront.net".to_string(),
            status: 200,
            metrics: TimingMetrics::with_end_time(Duration::from_millis(ms)),
            headers: HeaderValues::new(),
            body: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_publish_failures_do_not_stop_reporting() {
        let sink = Arc::new(FlakySink::default());
        let reporter = Reporter::new(sink.clone(), "CustomCloudFrontMetrics");

        let results = vec![
            result("lhr", 10),
            result("lhr", 20),
            result("lhr", 30),
            result("jfk", 40),
            result("jfk", 50),
        ];
        let summary = reporter.report_stream(futures::stream::iter(results)).await;

        assert_eq!(sink.seen.lock().len(), 5);
        assert_eq!(summary.published, 3);
        assert_eq!(summary.failed, 2);

        let lhr = summary.pops[&PopCode::new("lhr").unwrap()];
        assert_eq!(lhr.count, 2);
        assert_eq!(lhr.min_ms, 10);
        assert_eq!(lhr.max_ms, 30);
        assert_eq!(lhr.mean_ms(), 20.0);
    }

    #[tokio::test]
    async fn test_from_config_uses_namespace_and_name() {
        let sink = Arc::new(FlakySink::default());
        let config = OutputConfig {
            namespace: "Edge".to_string(),
            metric_name: "PrewarmLatency".to_string(),
            ..Default::default()
        };
        let reporter = Reporter::from_config(sink.clone(), &config);

        let datum = reporter.publish(&result("fra", 7)).await.unwrap();
        assert_eq!(datum.namespace, "Edge");
        assert_eq!(datum.name, "PrewarmLatency");
        assert_eq!(datum.dimension("POP"), Some("fra"));
        assert_eq!(datum.value, 7);
    }

    #[tokio::test]
    async fn test_empty_stream() {
        let reporter = Reporter::new(Arc::new(FlakySink::default()), "Edge");
        let summary = reporter
            .report_stream(futures::stream::iter(Vec::<FetchResult>::new()))
            .await;
        assert_eq!(summary, ReportSummary::default());
    }
}
