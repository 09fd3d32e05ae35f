//! Per-run accounting

use prewarm_core::{FailureKind, PopCode};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Counts describing how a run went.
///
/// `expected` is always `len(pops) x requests_per_pop`; every expected
/// attempt ends up in exactly one of `succeeded`, `undelivered` or
/// `failures`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Distinct POPs in the request
    pub pops_requested: usize,

    pub pops_resolved: usize,

    /// Resolution error message per POP that failed phase 1
    pub resolution_failures: BTreeMap<PopCode, String>,

    pub expected: u64,

    /// Attempts admitted past the concurrency gate
    pub launched: u64,

    /// Results delivered to the stream
    pub succeeded: u64,

    /// Successful fetches whose result could not be delivered because the
    /// consumer went away or the run was cancelled first
    pub undelivered: u64,

    pub failures: BTreeMap<FailureKind, u64>,

    pub elapsed: Duration,

    pub cancelled: bool,
}

impl RunSummary {
    pub fn record_failure(&mut self, kind: FailureKind) {
        self.record_failures(kind, 1);
    }

    pub fn record_failures(&mut self, kind: FailureKind, count: u64) {
        if count > 0 {
            *self.failures.entry(kind).or_default() += count;
        }
    }

    pub fn failures_of(&self, kind: FailureKind) -> u64 {
        self.failures.get(&kind).copied().unwrap_or_default()
    }

    pub fn failed(&self) -> u64 {
        self.failures.values().sum()
    }

    /// Every attempt succeeded and every POP resolved
    pub fn is_complete(&self) -> bool {
        self.succeeded == self.expected && self.resolution_failures.is_empty()
    }
}
