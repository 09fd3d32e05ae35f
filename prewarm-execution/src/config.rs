//! Orchestrator limits

use prewarm_config::ExecutionConfig;
use std::time::Duration;

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Fetches allowed in flight at once
    pub max_concurrent_fetches: usize,

    /// Deadline for each POP lookup
    pub resolve_timeout: Duration,

    /// Optional wall-clock bound for a whole run
    pub run_deadline: Option<Duration>,

    /// Result stream capacity
    pub result_buffer: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 64,
            resolve_timeout: Duration::from_secs(5),
            run_deadline: None,
            result_buffer: 256,
        }
    }
}

impl OrchestratorConfig {
    pub fn with_max_concurrent_fetches(mut self, max: usize) -> Self {
        self.max_concurrent_fetches = max.max(1);
        self
    }

    pub fn with_run_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.run_deadline = deadline;
        self
    }
}

impl From<ExecutionConfig> for OrchestratorConfig {
    fn from(config: ExecutionConfig) -> Self {
        Self {
            // A zero-permit semaphore would never admit anything
            max_concurrent_fetches: config.max_concurrent_fetches.max(1),
            resolve_timeout: config.resolve_timeout,
            run_deadline: config.run_deadline,
            result_buffer: config.result_buffer.max(1),
        }
    }
}
