//! Per-fetch latency breakdown

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Phase timings for one fetch.
///
/// `ttfb`, `first_chunk` and `end_time` are offsets from request start.
/// `dns_lookup` comes from the resolution phase of the run and `connect`
/// is the duration of the connect step alone. Only `end_time` is
/// guaranteed; the rest are absent when the phase did not happen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingMetrics {
    /// Time until response headers arrived
    pub ttfb: Option<Duration>,

    /// Time until the first body chunk arrived (absent for empty bodies)
    pub first_chunk: Option<Duration>,

    /// Time until the whole body was read
    pub end_time: Duration,

    /// Resolution time of the POP probe hostname
    pub dns_lookup: Option<Duration>,

    /// TCP dial plus TLS handshake to the POP address
    pub connect: Option<Duration>,
}

impl TimingMetrics {
    pub fn with_end_time(end_time: Duration) -> Self {
        Self {
            end_time,
            ..Default::default()
        }
    }

    /// End time in whole milliseconds, truncated
    pub fn end_time_millis(&self) -> u64 {
        self.end_time.as_millis() as u64
    }
}
