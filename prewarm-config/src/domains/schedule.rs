//! Repeated-run scheduling

use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Schedule configuration. Without an interval the binary runs once.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Time between run starts
    #[serde(
        with = "crate::domains::utils::serde_seconds_option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub interval: Option<Duration>,

    /// Stop after this many runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_runs: Option<u32>,
}

impl Validatable for ScheduleConfig {
    fn validate(&self) -> ConfigResult<()> {
        if let Some(interval) = self.interval {
            validate_positive(interval.as_secs(), "interval", self.domain_name())?;
        }
        if let Some(max_runs) = self.max_runs {
            validate_positive(max_runs, "max_runs", self.domain_name())?;
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "schedule"
    }
}
