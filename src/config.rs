//! Runtime configuration for the vanity mint generator.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::crypto::MAX_ADDRESS_LEN;
use crate::matcher::SuffixPattern;

/// Minimum number of workers used when `--workers` is not given.
pub const MIN_DEFAULT_WORKERS: usize = 128;

/// Solana Vanity Mint Generator
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Suffix the mint address must end with (case-insensitive)
    #[arg(short, long, default_value = "ponk")]
    pub suffix: String,

    /// Number of mints to collect
    #[arg(short = 'n', long, default_value = "100")]
    pub count: usize,

    /// Output file for the mint pool
    #[arg(short, long, default_value = "vanity-mints-pool.json")]
    pub output: PathBuf,

    /// Number of worker threads (default: max(128, 4 x CPU cores))
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// How long to wait for workers to stop before detaching them, in milliseconds
    #[arg(short = 'g', long, default_value = "1000")]
    pub grace_period_ms: u64,

    /// Progress report interval in seconds
    #[arg(short = 'r', long, default_value = "5")]
    pub report_interval: u64,

    /// Merge new mints into an existing output file instead of replacing it
    #[arg(long, default_value = "false")]
    pub append: bool,

    /// Verify the mints in the output file and exit
    #[arg(long, default_value = "false")]
    pub verify: bool,
}

impl Config {
    /// Returns the number of workers, defaulting to max(128, 4 x CPU count)
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(default_worker_count)
    }

    /// Validates the configuration
    ///
    /// The worker count is not checked here; a count of zero is rejected when
    /// the search starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count == 0 {
            return Err(ConfigError::InvalidCount);
        }

        if self.suffix.chars().count() > MAX_ADDRESS_LEN {
            return Err(ConfigError::InvalidSuffix(format!(
                "Suffix cannot be longer than {} characters (full address)",
                MAX_ADDRESS_LEN
            )));
        }

        if !SuffixPattern::new(self.suffix.as_str()).is_reachable() {
            return Err(ConfigError::InvalidSuffix(
                "Suffix must contain only characters that can appear in a base58 address".into(),
            ));
        }

        Ok(())
    }

    /// Returns the settings handed to the coordinator
    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            pattern: SuffixPattern::new(self.suffix.as_str()),
            target: self.count,
            workers: self.worker_count(),
            grace_period: Duration::from_millis(self.grace_period_ms),
            report_interval: Duration::from_secs(self.report_interval),
        }
    }
}

/// max(128, 4 x available CPUs)
pub fn default_worker_count() -> usize {
    MIN_DEFAULT_WORKERS.max(num_cpus::get() * 4)
}

/// Immutable settings for one search run.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// The suffix to search for
    pub pattern: SuffixPattern,
    /// Number of matches to collect
    pub target: usize,
    /// Number of worker threads
    pub workers: usize,
    /// Shared deadline for workers to stop once collection ends
    pub grace_period: Duration,
    /// Interval between heartbeat reports while no match arrives
    pub report_interval: Duration,
}

impl SearchSettings {
    /// Creates settings with a one second grace period and five second reports.
    pub fn new(suffix: &str, target: usize, workers: usize) -> Self {
        Self {
            pattern: SuffixPattern::new(suffix),
            target,
            workers,
            grace_period: Duration::from_secs(1),
            report_interval: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid suffix: {0}")]
    InvalidSuffix(String),

    #[error("Invalid count: at least one mint must be requested")]
    InvalidCount,
}
