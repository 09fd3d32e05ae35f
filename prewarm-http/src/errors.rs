//! Fetch error types

use prewarm_core::{FailureKind, PopCode};
use std::time::Duration;

/// Error type for a single forced-IP fetch
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("no resolved address for POP {pop}")]
    MissingAddress { pop: PopCode },

    #[error("invalid address {ip:?} for POP {pop}")]
    InvalidAddress { pop: PopCode, ip: String },

    #[error("Invalid request: {0}")]
    Request(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} timed out after {elapsed:?}")]
    Timeout { url: String, elapsed: Duration },

    #[error("Failed to read body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Fetch cancelled")]
    Cancelled,
}

impl FetchError {
    /// Failure class used for run accounting
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::MissingAddress { .. } => FailureKind::Unresolved,
            FetchError::InvalidAddress { .. } | FetchError::Request(_) | FetchError::Client(_) => {
                FailureKind::Request
            }
            FetchError::Transport { .. } => FailureKind::Transport,
            FetchError::Timeout { .. } => FailureKind::Timeout,
            FetchError::Body { .. } => FailureKind::Body,
            FetchError::Cancelled => FailureKind::Cancelled,
        }
    }
}
