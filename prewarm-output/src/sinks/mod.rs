//! Metric sink implementations

pub mod stdio;
pub mod webhook;

pub use stdio::StdioSink;
pub use webhook::WebhookSink;

use crate::errors::{OutputError, ReportingError};
use crate::metric::MetricDatum;
use async_trait::async_trait;
use prewarm_config::{OutputConfig, SinkConfig};
use std::sync::Arc;

/// Destination for metric observations
#[async_trait]
pub trait MetricSink: Send + Sync {
    /// Publish one observation
    async fn publish(&self, datum: &MetricDatum) -> Result<(), ReportingError>;

    /// Short name used in logs
    fn sink_type(&self) -> &'static str;
}

/// Construct the sink selected by the output configuration
pub fn build_sink(config: &OutputConfig) -> Result<Arc<dyn MetricSink>, OutputError> {
    match &config.sink {
        SinkConfig::Stdout { format } => Ok(Arc::new(StdioSink::stdout(*format))),
        SinkConfig::Webhook {
            url,
            timeout,
            headers,
        } => {
            let sink = WebhookSink::new(url, *timeout, headers.clone())?;
            Ok(Arc::new(sink))
        }
    }
}
