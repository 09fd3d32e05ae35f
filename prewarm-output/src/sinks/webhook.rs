//! Webhook sink

use crate::errors::{OutputError, ReportingError};
use crate::metric::MetricDatum;
use crate::sinks::MetricSink;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// POSTs each observation as JSON. No retries: a failed publish is
/// reported to the caller and the next observation goes out regardless.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    url: String,
    client: reqwest::Client,
}

impl WebhookSink {
    pub fn new(
        url: &str,
        timeout: Duration,
        headers: HashMap<String, String>,
    ) -> Result<Self, OutputError> {
        reqwest::Url::parse(url)
            .map_err(|e| OutputError::Configuration(format!("invalid webhook URL {}: {}", url, e)))?;

        let mut default_headers = HeaderMap::new();
        for (name, value) in headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                OutputError::Configuration(format!("invalid header name {:?}: {}", name, e))
            })?;
            let header_value = HeaderValue::from_str(&value).map_err(|e| {
                OutputError::Configuration(format!("invalid value for header {}: {}", name, e))
            })?;
            default_headers.insert(header_name, header_value);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .default_headers(default_headers)
            .user_agent(concat!("pop-prewarm/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OutputError::Configuration(format!("webhook client: {}", e)))?;

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl MetricSink for WebhookSink {
    async fn publish(&self, datum: &MetricDatum) -> Result<(), ReportingError> {
        let response = self
            .client
            .post(&self.url)
            .json(datum)
            .send()
            .await
            .map_err(|e| ReportingError::Network {
                url: self.url.clone(),
                error: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            debug!("Published {} to {}", datum.name, self.url);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ReportingError::WebhookFailed {
            url: self.url.clone(),
            status: status.as_u16(),
            response: body,
        })
    }

    fn sink_type(&self) -> &'static str {
        "webhook"
    }
}
