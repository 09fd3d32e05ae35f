//! Resolution error types

use std::time::Duration;

/// Error type for a single POP resolution
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("error looking up IP for {host}: {source}")]
    Lookup {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no IP addresses found for {host}")]
    NoAddresses { host: String },

    #[error("lookup for {host} timed out after {timeout:?}")]
    Timeout { host: String, timeout: Duration },

    #[error("lookup for {host} was cancelled")]
    Cancelled { host: String },
}

impl ResolutionError {
    /// Hostname the failed lookup was for
    pub fn host(&self) -> &str {
        match self {
            ResolutionError::Lookup { host, .. }
            | ResolutionError::NoAddresses { host }
            | ResolutionError::Timeout { host, .. }
            | ResolutionError::Cancelled { host } => host,
        }
    }
}
