//! Domain-specific configuration modules

pub mod execution;
pub mod http;
pub mod logging;
pub mod output;
pub mod probe;
pub mod schedule;
pub mod utils;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main prewarm configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PrewarmConfig {
    /// What to probe: distribution, path, POPs, request count
    #[serde(default)]
    pub probe: probe::ProbeConfig,

    /// Forced-IP HTTP transport configuration
    #[serde(default)]
    pub http: http::HttpConfig,

    /// Resolution and fan-out limits
    #[serde(default)]
    pub execution: execution::ExecutionConfig,

    /// Metric output configuration
    #[serde(default)]
    pub output: output::OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,

    /// Repeated runs
    #[serde(default)]
    pub schedule: schedule::ScheduleConfig,
}

impl PrewarmConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.probe.validate()?;
        self.http.validate()?;
        self.execution.validate()?;
        self.output.validate()?;
        self.logging.validate()?;
        self.schedule.validate()?;
        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = PrewarmConfig::default();
        serde_yaml::to_string(&config)
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}
