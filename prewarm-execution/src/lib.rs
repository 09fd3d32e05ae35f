//! Run orchestration
//!
//! A run resolves every POP, waits for the whole batch, then fans out
//! `len(pops) x requests_per_pop` forced-IP fetches under a concurrency cap
//! and streams the successful results to a single consumer.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod request;
pub mod summary;

pub use config::OrchestratorConfig;
pub use error::{ExecutionError, ExecutionResult};
pub use orchestrator::{Orchestrator, RunHandle};
pub use request::RunRequest;
pub use summary::RunSummary;
