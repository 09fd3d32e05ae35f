//! Logging setup for POP prewarming
//!
//! All crates log through `tracing`; this crate only installs the global
//! subscriber. Output goes to stderr so that metric lines written to stdout
//! (the EMF sink) are never interleaved with log records.

pub mod init;

pub use init::{build_env_filter, init_logging_from_config, init_simple_tracing};
