//! Line-oriented sink for stdout

use crate::errors::ReportingError;
use crate::metric::MetricDatum;
use crate::sinks::MetricSink;
use async_trait::async_trait;
use prewarm_config::MetricFormat;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

/// Writes one JSON document per line.
///
/// In EMF mode the lines are CloudWatch Embedded Metric Format, which a
/// Lambda's log stream turns into metrics without an API call.
#[derive(Debug)]
pub struct StdioSink<W = Stdout> {
    format: MetricFormat,
    writer: Mutex<W>,
}

impl StdioSink<Stdout> {
    pub fn stdout(format: MetricFormat) -> Self {
        Self::with_writer(format, tokio::io::stdout())
    }
}

impl<W> StdioSink<W>
where
    W: AsyncWrite + Send + Unpin,
{
    pub fn with_writer(format: MetricFormat, writer: W) -> Self {
        Self {
            format,
            writer: Mutex::new(writer),
        }
    }

    pub fn into_writer(self) -> W {
        self.writer.into_inner()
    }

    fn format_line(&self, datum: &MetricDatum) -> Result<Vec<u8>, ReportingError> {
        let mut line = match self.format {
            MetricFormat::Emf => serde_json::to_vec(&datum.to_emf()),
            MetricFormat::JsonLines => serde_json::to_vec(datum),
        }
        .map_err(|e| ReportingError::Serialization {
            format: format!("{:?}", self.format),
            error: e.to_string(),
        })?;
        line.push(b'\n');
        Ok(line)
    }
}

#[async_trait]
impl<W> MetricSink for StdioSink<W>
where
    W: AsyncWrite + Send + Unpin,
{
    async fn publish(&self, datum: &MetricDatum) -> Result<(), ReportingError> {
        let line = self.format_line(datum)?;
        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }

    fn sink_type(&self) -> &'static str {
        "stdout"
    }
}
