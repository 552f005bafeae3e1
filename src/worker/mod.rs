//! Parallel vanity mint search.
//!
//! This module provides:
//! - CPU workers that generate and test keypairs
//! - A worker pool with cooperative stop and bounded shutdown
//! - The coordinator that collects matches until the target is reached

mod coordinator;
mod cpu;
mod pool;
pub(crate) mod record;

#[cfg(test)]
pub(crate) mod test_support;

pub use coordinator::{Coordinator, SearchError, SearchOutcome, Termination, CHANNEL_CAPACITY};
pub use cpu::{CpuWorker, WorkerExit};
pub use pool::{ShutdownReport, WorkerPool};
pub use record::MatchRecord;
