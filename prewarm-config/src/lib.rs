//! Domain-driven configuration management for POP prewarming
//!
//! Configuration is split by functional domain (probe inputs, HTTP transport,
//! execution limits, metric output, logging, scheduling). Every domain has
//! defaults, can be overridden from the environment and validates itself.

pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use validation::Validatable;

// Re-export domain configurations
pub use domains::{
    execution::ExecutionConfig,
    http::{HttpConfig, HttpScheme},
    logging::{LogFormat, LogLevel, LoggingConfig},
    output::{MetricFormat, OutputConfig, SinkConfig},
    probe::{PopList, ProbeConfig},
    schedule::ScheduleConfig,
    PrewarmConfig,
};

// Re-export utilities
pub use domains::utils::{serde_seconds, serde_seconds_option};
