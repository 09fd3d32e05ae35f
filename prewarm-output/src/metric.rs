//! Metric observations and their wire shapes

use chrono::{DateTime, Utc};
use prewarm_core::FetchResult;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};
use std::collections::BTreeMap;

pub const RESPONSE_TIME_METRIC: &str = "ResponseTime";
pub const POP_DIMENSION: &str = "POP";

/// Unit of a metric value, named the way CloudWatch names them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricUnit {
    Milliseconds,
}

impl MetricUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricUnit::Milliseconds => "Milliseconds",
        }
    }
}

/// One metric observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDatum {
    pub namespace: String,
    pub name: String,
    pub dimensions: BTreeMap<String, String>,
    pub value: u64,
    pub unit: MetricUnit,
    pub timestamp: DateTime<Utc>,
}

impl MetricDatum {
    /// `ResponseTime` for one fetch: end time in whole milliseconds, by POP
    pub fn response_time(namespace: impl Into<String>, result: &FetchResult) -> Self {
        let mut dimensions = BTreeMap::new();
        dimensions.insert(POP_DIMENSION.to_string(), result.pop.to_string());
        Self {
            namespace: namespace.into(),
            name: RESPONSE_TIME_METRIC.to_string(),
            dimensions,
            value: result.metrics.end_time_millis(),
            unit: MetricUnit::Milliseconds,
            timestamp: Utc::now(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn dimension(&self, name: &str) -> Option<&str> {
        self.dimensions.get(name).map(String::as_str)
    }

    /// CloudWatch Embedded Metric Format document for this observation
    pub fn to_emf(&self) -> JsonValue {
        let dimension_names: Vec<&str> = self.dimensions.keys().map(String::as_str).collect();

        let mut doc = Map::new();
        doc.insert(
            "_aws".to_string(),
            json!({
                "Timestamp": self.timestamp.timestamp_millis(),
                "CloudWatchMetrics": [{
                    "Namespace": self.namespace,
                    "Dimensions": [dimension_names],
                    "Metrics": [{ "Name": self.name, "Unit": self.unit.as_str() }],
                }],
            }),
        );
        for (name, value) in &self.dimensions {
            doc.insert(name.clone(), JsonValue::String(value.clone()));
        }
        doc.insert(self.name.clone(), json!(self.value));
        JsonValue::Object(doc)
    }
}
