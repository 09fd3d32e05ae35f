//! Metric output configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, validate_url, Validatable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Metric namespace
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Name of the per-fetch latency metric
    #[serde(default = "default_metric_name")]
    pub metric_name: String,

    /// Where metric observations go
    #[serde(default)]
    pub sink: SinkConfig,
}

/// Metric sink selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SinkConfig {
    /// One line per observation on stdout
    Stdout {
        #[serde(default)]
        format: MetricFormat,
    },
    /// POST each observation as JSON
    Webhook {
        url: String,
        #[serde(
            with = "crate::domains::utils::serde_seconds",
            default = "default_webhook_timeout"
        )]
        timeout: Duration,
        #[serde(default)]
        headers: HashMap<String, String>,
    },
}

/// Line format for the stdout sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MetricFormat {
    /// CloudWatch Embedded Metric Format
    #[default]
    Emf,
    /// Plain JSON object per line
    JsonLines,
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig::Stdout {
            format: MetricFormat::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            metric_name: default_metric_name(),
            sink: SinkConfig::default(),
        }
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.namespace, "namespace", self.domain_name())?;
        validate_required_string(&self.metric_name, "metric_name", self.domain_name())?;
        self.sink.validate()
    }

    fn domain_name(&self) -> &'static str {
        "output"
    }
}

impl Validatable for SinkConfig {
    fn validate(&self) -> ConfigResult<()> {
        match self {
            SinkConfig::Stdout { .. } => Ok(()),
            SinkConfig::Webhook {
                url,
                timeout,
                headers,
            } => {
                validate_url(url, "url", self.domain_name())?;
                validate_positive(timeout.as_secs(), "timeout", self.domain_name())?;
                if headers.keys().any(|name| name.trim().is_empty()) {
                    return Err(self.validation_error("header names cannot be empty"));
                }
                Ok(())
            }
        }
    }

    fn domain_name(&self) -> &'static str {
        "output.sink"
    }
}

// Default value functions
fn default_namespace() -> String {
    "CustomCloudFrontMetrics".to_string()
}

fn default_metric_name() -> String {
    "ResponseTime".to_string()
}

fn default_webhook_timeout() -> Duration {
    Duration::from_secs(10)
}
