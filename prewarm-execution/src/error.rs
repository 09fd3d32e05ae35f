//! Error types for run orchestration

use thiserror::Error;
use tokio::task::JoinError;

/// Run-level errors. Per-attempt failures never surface here; they are
/// counted in the run summary instead.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Run driver panicked: {0}")]
    DriverPanicked(String),

    #[error("Run driver was aborted")]
    DriverAborted,
}

pub type ExecutionResult<T> = Result<T, ExecutionError>;

impl From<JoinError> for ExecutionError {
    fn from(err: JoinError) -> Self {
        if err.is_panic() {
            Self::DriverPanicked(err.to_string())
        } else {
            Self::DriverAborted
        }
    }
}
