//! Progress events emitted by the coordinator.
//!
//! The coordinator reports every collected match and a periodic heartbeat to
//! a [`ProgressObserver`]. [`LogObserver`] writes them through the `log` crate.

use std::time::Duration;

use log::info;

use crate::worker::MatchRecord;

/// A match as seen by the coordinator, with the aggregate state after it.
#[derive(Debug, Clone, Copy)]
pub struct MatchEvent<'a> {
    /// 1-based position of this match in the collected sequence
    pub index: usize,
    /// Number of matches the run is collecting
    pub target: usize,
    /// The match itself, including the worker's own statistics
    pub record: &'a MatchRecord,
    /// Aggregate state after this match
    pub progress: Progress,
}

/// Aggregate search state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Matches collected so far
    pub collected: usize,
    /// Number of matches the run is collecting
    pub target: usize,
    /// Attempts reported by collected matches
    pub total_attempts: u64,
    /// Wall-clock time since collection started
    pub elapsed: Duration,
    /// `total_attempts` per second of `elapsed`
    pub rate: f64,
}

/// Receives progress notifications from the coordinator.
pub trait ProgressObserver {
    /// Called once all workers have been spawned.
    fn on_started(&self, _workers: usize, _target: usize) {}

    /// Called for every collected match, in receive order.
    fn on_match(&self, event: &MatchEvent<'_>);

    /// Called when no match arrived during a report interval.
    fn on_heartbeat(&self, _progress: &Progress) {}
}

/// Reports progress through the `log` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ProgressObserver for LogObserver {
    fn on_started(&self, workers: usize, target: usize) {
        info!(
            "{} workers started, collecting {} mint(s)...",
            workers, target
        );
    }

    fn on_match(&self, event: &MatchEvent<'_>) {
        let record = event.record;
        let progress = &event.progress;
        info!(
            "[{}/{}] Found: {}",
            event.index, event.target, record.mint_address
        );
        info!(
            "    Worker {}: {} attempts in {:.2}s (~{}/sec)",
            record.worker_id,
            format_number(record.attempts_since_last_match),
            record.elapsed_secs,
            format_number(record.attempt_rate as u64)
        );
        info!(
            "    Total: {} attempts in {:.2}s (~{}/sec avg)",
            format_number(progress.total_attempts),
            progress.elapsed.as_secs_f64(),
            format_number(progress.rate as u64)
        );
    }

    fn on_heartbeat(&self, progress: &Progress) {
        info!(
            "[{:>4}s] {}/{} mint(s) collected",
            progress.elapsed.as_secs(),
            progress.collected,
            progress.target
        );
    }
}

/// Formats a count with K/M/B suffixes.
pub fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}
