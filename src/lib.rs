//! # sol_vanity
//!
//! High-performance Solana vanity mint generator.
//!
//! ## Architecture
//!
//! - `crypto`: Ed25519 key generation and base58 address encoding
//! - `matcher`: Case-insensitive suffix matching
//! - `worker`: Parallel workers, worker pool and the collecting coordinator
//! - `stats`: Running totals and final run statistics
//! - `progress`: Progress events for logging and other observers
//! - `output`: The JSON mint pool artifact
//! - `config`: Runtime configuration

pub mod config;
pub mod crypto;
pub mod matcher;
pub mod output;
pub mod progress;
pub mod stats;
pub mod worker;

pub use config::{Config, SearchSettings};
pub use crypto::{Address, KeyGenerator, Keypair, KeygenError, OsKeyGenerator};
pub use matcher::{matches, SuffixPattern};
pub use output::{MintEntry, MintPool, OutputError, VerifyReport};
pub use progress::{LogObserver, MatchEvent, Progress, ProgressObserver};
pub use stats::{RunStatistics, Tally};
pub use worker::{
    Coordinator, MatchRecord, SearchError, SearchOutcome, ShutdownReport, Termination, WorkerPool,
};
