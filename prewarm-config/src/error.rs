//! Configuration error types

use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or validating a prewarm configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// An environment override could not be parsed
    #[error("Environment variable error: {0}")]
    EnvError(String),

    /// A value rejected by the validator of its section
    #[error("Invalid {domain} configuration: {message}")]
    DomainError { domain: String, message: String },
}
