//! Resolution and fan-out limits

use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Execution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Upper bound on fetches in flight at once
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Deadline for a single POP lookup
    #[serde(
        with = "crate::domains::utils::serde_seconds",
        default = "default_resolve_timeout"
    )]
    pub resolve_timeout: Duration,

    /// Wall-clock bound for a whole run
    #[serde(
        with = "crate::domains::utils::serde_seconds_option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub run_deadline: Option<Duration>,

    /// Capacity of the result stream before producers wait on the consumer
    #[serde(default = "default_result_buffer")]
    pub result_buffer: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_max_concurrent_fetches(),
            resolve_timeout: default_resolve_timeout(),
            run_deadline: None,
            result_buffer: default_result_buffer(),
        }
    }
}

impl Validatable for ExecutionConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(
            self.max_concurrent_fetches,
            "max_concurrent_fetches",
            self.domain_name(),
        )?;
        validate_positive(
            self.resolve_timeout.as_secs(),
            "resolve_timeout",
            self.domain_name(),
        )?;
        validate_positive(self.result_buffer, "result_buffer", self.domain_name())?;

        if let Some(deadline) = self.run_deadline {
            validate_positive(deadline.as_secs(), "run_deadline", self.domain_name())?;
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "execution"
    }
}

// Default value functions
fn default_max_concurrent_fetches() -> usize {
    64
}

fn default_resolve_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_result_buffer() -> usize {
    256
}
