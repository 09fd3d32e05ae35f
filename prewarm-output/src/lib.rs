//! # Prewarm metric reporting
//!
//! Turns every fetch result of a run into one `ResponseTime` observation,
//! dimensioned by POP, and hands it to a [`MetricSink`]:
//!
//! - **stdout**: CloudWatch Embedded Metric Format lines (picked up from the
//!   log stream when running as a Lambda) or plain JSON lines
//! - **webhook**: one JSON `POST` per observation
//!
//! A failed publish is logged and counted; it never stops the remaining
//! results from being reported.

pub mod errors;
pub mod metric;
pub mod reporter;
pub mod sinks;

pub use errors::{OutputError, ReportingError};
pub use metric::{MetricDatum, MetricUnit, POP_DIMENSION, RESPONSE_TIME_METRIC};
pub use reporter::{PopStats, ReportSummary, Reporter};
pub use sinks::{build_sink, MetricSink, StdioSink, WebhookSink};
