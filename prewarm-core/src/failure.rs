//! Classification of per-attempt failures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a fetch attempt produced no result.
///
/// Every fetch error maps onto one of these so a run can report counts per
/// kind instead of only logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The POP had no resolved address
    Unresolved,
    /// The request could not be constructed (bad URL, path or address)
    Request,
    /// Dial, TLS handshake or protocol failure
    Transport,
    /// Per-fetch deadline exceeded
    Timeout,
    /// The response body could not be read
    Body,
    /// The run was cancelled before or during the attempt
    Cancelled,
    /// The attempt's task panicked or was aborted
    Aborted,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Unresolved => "unresolved",
            FailureKind::Request => "request",
            FailureKind::Transport => "transport",
            FailureKind::Timeout => "timeout",
            FailureKind::Body => "body",
            FailureKind::Cancelled => "cancelled",
            FailureKind::Aborted => "aborted",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
