//! Core domain types for POP prewarming
//!
//! This crate defines the language shared by the resolver, the forced-IP
//! fetcher, the orchestrator and the reporters: POP codes, distribution
//! hostnames, the per-fetch timing record and the fetch result itself.
//! It has no async or network dependencies.

pub mod distribution;
pub mod failure;
pub mod pop;
pub mod result;
pub mod timing;

// Re-export commonly used types at the crate root
pub use distribution::{Distribution, PLACEHOLDER_DOMAIN};
pub use failure::FailureKind;
pub use pop::{parse_pop_list, PopCode, PopCodeError};
pub use result::{FetchResult, HeaderValues};
pub use timing::TimingMetrics;
