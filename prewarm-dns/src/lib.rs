//! DNS resolution of POP-specific hostnames
//!
//! Every POP of a distribution answers on `<id>.<pop>.cloudfront.net`.
//! Resolving that name yields an address of that edge location, which the
//! forced-IP fetcher then dials directly.

pub mod batch;
pub mod errors;
pub mod resolver;

pub use batch::{resolve_all, resolve_pop, PopIpMap, ResolutionReport, ResolvedPop};
pub use errors::ResolutionError;
pub use resolver::{PopResolver, StaticResolver, SystemResolver};
