//! Running totals and final run statistics.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use crate::progress::{MatchEvent, Progress};
use crate::worker::record::rate;
use crate::worker::MatchRecord;

/// Statistics for one finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatistics {
    pub generated_at: DateTime<Local>,
    pub suffix: String,
    pub match_count: usize,
    pub total_attempts: u64,
    pub total_elapsed: Duration,
    pub average_attempts: u64,
    pub workers: usize,
    /// Always false: the search runs on CPU threads only.
    pub gpu_used: bool,
    pub gpu_name: Option<String>,
}

impl RunStatistics {
    /// Overall attempts per second.
    pub fn attempts_per_second(&self) -> f64 {
        rate(self.total_attempts, self.total_elapsed.as_secs_f64())
    }
}

/// `round(total_attempts / count)`, or `None` when nothing was collected.
///
/// Halves round to the nearest even value.
pub fn average_attempts(total_attempts: u64, count: usize) -> Option<u64> {
    if count == 0 {
        return None;
    }
    let count = count as u64;
    let (quotient, remainder) = (total_attempts / count, total_attempts % count);
    let twice = u128::from(remainder) * 2;
    let round_up = match twice.cmp(&u128::from(count)) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Equal => quotient % 2 == 1,
        std::cmp::Ordering::Less => false,
    };
    Some(quotient + u64::from(round_up))
}

/// Accumulates match records in receive order.
#[derive(Debug)]
pub struct Tally {
    target: usize,
    matches: Vec<MatchRecord>,
    total_attempts: u64,
    started: Instant,
}

impl Tally {
    /// Starts a tally for `target` matches; the clock starts now.
    pub fn new(target: usize) -> Self {
        Self {
            target,
            matches: Vec::with_capacity(target.min(4096)),
            total_attempts: 0,
            started: Instant::now(),
        }
    }

    /// Appends a record and returns the event describing it.
    pub fn record(&mut self, record: MatchRecord) -> MatchEvent<'_> {
        self.total_attempts += record.attempts_since_last_match;
        self.matches.push(record);

        let progress = self.progress();
        MatchEvent {
            index: self.matches.len(),
            target: self.target,
            record: &self.matches[self.matches.len() - 1],
            progress,
        }
    }

    /// Returns the current aggregate state.
    pub fn progress(&self) -> Progress {
        let elapsed = self.started.elapsed();
        Progress {
            collected: self.matches.len(),
            target: self.target,
            total_attempts: self.total_attempts,
            elapsed,
            rate: rate(self.total_attempts, elapsed.as_secs_f64()),
        }
    }

    /// Number of collected matches.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Returns true once the target has been reached.
    pub fn is_complete(&self) -> bool {
        self.matches.len() >= self.target
    }

    /// Sum of attempts over collected matches.
    pub fn total_attempts(&self) -> u64 {
        self.total_attempts
    }

    /// Finalizes the run. Returns `None` when no match was collected.
    pub fn finish(self, suffix: &str, workers: usize) -> Option<(Vec<MatchRecord>, RunStatistics)> {
        let average = average_attempts(self.total_attempts, self.matches.len())?;
        let stats = RunStatistics {
            generated_at: Local::now(),
            suffix: suffix.to_string(),
            match_count: self.matches.len(),
            total_attempts: self.total_attempts,
            total_elapsed: self.started.elapsed(),
            average_attempts: average,
            workers,
            gpu_used: false,
            gpu_name: None,
        };
        Some((self.matches, stats))
    }
}
