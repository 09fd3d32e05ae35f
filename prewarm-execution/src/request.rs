//! Inputs of one run

use crate::error::ExecutionResult;
use prewarm_config::ProbeConfig;
use prewarm_core::{Distribution, PopCode};

/// What one run should fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub distribution: Distribution,

    /// POPs in the order given; duplicates each get their own fetches
    pub pops: Vec<PopCode>,

    pub requests_per_pop: u32,

    pub path: String,
}

impl RunRequest {
    pub fn new(
        distribution: Distribution,
        pops: Vec<PopCode>,
        requests_per_pop: u32,
        path: impl Into<String>,
    ) -> Self {
        Self {
            distribution,
            pops,
            requests_per_pop,
            path: path.into(),
        }
    }

    /// Build a request from the probe section of the configuration
    pub fn from_probe(probe: &ProbeConfig) -> ExecutionResult<Self> {
        let pops = probe
            .pops
            .codes()
            .map_err(|e| crate::error::ExecutionError::ConfigurationError(e.to_string()))?;
        Ok(Self::new(
            probe.distribution(),
            pops,
            probe.requests_per_pop,
            probe.url_path.clone(),
        ))
    }

    /// Total number of fetch attempts this request stands for
    pub fn expected_fetches(&self) -> u64 {
        self.pops.len() as u64 * u64::from(self.requests_per_pop)
    }
}
