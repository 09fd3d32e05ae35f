//! Forced-IP HTTP fetches
//!
//! A fetch dials one pre-resolved POP address while the URL, and therefore
//! the TLS server name and the `Host` header, keep the distribution's logical
//! hostname. That pins the request to a single edge node and still passes
//! certificate validation and virtual-host routing.

pub mod client;
pub mod config;
mod connect;
pub mod errors;

// Re-export main types for convenience
pub use client::{fetch_url, FetchTarget, ForcedIpFetcher, PopFetcher};
pub use config::FetchConfig;
pub use errors::FetchError;
pub use prewarm_config::HttpScheme;
