//! Output error types

use thiserror::Error;

/// Failure to publish one metric observation
#[derive(Debug, Error)]
pub enum ReportingError {
    #[error("Serialization error ({format}): {error}")]
    Serialization { format: String, error: String },

    #[error("Failed to write metric: {0}")]
    Io(#[from] std::io::Error),

    #[error("Webhook failed: {url} returned {status}: {response}")]
    WebhookFailed {
        url: String,
        status: u16,
        response: String,
    },

    #[error("Network error for {url}: {error}")]
    Network { url: String, error: String },
}

/// Errors setting up reporting. These are fatal to a run.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Configuration error: {0}")]
    Configuration(String),
}
