//! Match collection and run lifecycle.
//!
//! A run moves through four phases:
//!
//! 1. Spawning: start the configured number of workers
//! 2. Collecting: receive matches until the target is reached, the run is
//!    interrupted, or no worker is left
//! 3. Stopping: raise the stop flag, close the channel, wait out the grace period
//! 4. Done: finalize statistics

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use log::{debug, warn};

use crate::config::SearchSettings;
use crate::crypto::{KeyGenerator, OsKeyGenerator};
use crate::progress::{LogObserver, ProgressObserver};
use crate::stats::{RunStatistics, Tally};

use super::pool::{ShutdownReport, WorkerPool};
use super::MatchRecord;

/// Capacity of the result channel between workers and the coordinator.
pub const CHANNEL_CAPACITY: usize = 1024;

/// How often the collecting loop wakes up to check for interruption.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Spawning,
    Collecting,
    Stopping,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Spawning => write!(f, "spawning"),
            Phase::Collecting => write!(f, "collecting"),
            Phase::Stopping => write!(f, "stopping"),
            Phase::Done => write!(f, "done"),
        }
    }
}

fn advance(phase: &mut Phase, next: Phase) {
    debug!("coordinator: {} -> {}", phase, next);
    *phase = next;
}

/// Why collection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The configured number of matches was collected
    TargetReached,
    /// The interrupt flag was raised
    Interrupted,
    /// Every worker exited before the target was reached
    WorkersExhausted,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::TargetReached => write!(f, "target reached"),
            Termination::Interrupted => write!(f, "interrupted"),
            Termination::WorkersExhausted => write!(f, "all workers exited"),
        }
    }
}

/// Errors that end a run without results.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("worker count must be at least 1")]
    NoWorkers,

    #[error("failed to spawn worker threads: {0}")]
    Spawn(#[source] io::Error),

    #[error("no mints were generated ({0})")]
    NoMatches(Termination),
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct SearchOutcome {
    /// Collected matches, in receive order
    pub matches: Vec<MatchRecord>,
    pub stats: RunStatistics,
    pub termination: Termination,
    pub shutdown: ShutdownReport,
}

/// Runs the workers and collects their matches.
pub struct Coordinator {
    settings: SearchSettings,
    /// Raised from outside (e.g. Ctrl-C) to end collection early
    interrupt: Arc<AtomicBool>,
    observer: Box<dyn ProgressObserver>,
}

impl Coordinator {
    /// Creates a coordinator that reports progress through the log.
    pub fn new(settings: SearchSettings) -> Self {
        Self {
            settings,
            interrupt: Arc::new(AtomicBool::new(false)),
            observer: Box::new(LogObserver),
        }
    }

    /// Replaces the progress observer.
    pub fn with_observer(mut self, observer: impl ProgressObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Returns the flag that interrupts collection when set.
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.interrupt.clone()
    }

    /// Searches with keys from the operating system entropy source.
    pub fn run(&self) -> Result<SearchOutcome, SearchError> {
        self.run_with(|_| OsKeyGenerator)
    }

    /// Searches with one generator per worker, built by `make_generator`.
    pub fn run_with<G, F>(&self, make_generator: F) -> Result<SearchOutcome, SearchError>
    where
        G: KeyGenerator + 'static,
        F: FnMut(usize) -> G,
    {
        let settings = &self.settings;
        let mut phase = Phase::Spawning;
        debug!("coordinator: {}", phase);

        let (result_tx, result_rx) = bounded(CHANNEL_CAPACITY);
        let pool = WorkerPool::spawn(settings.workers, &settings.pattern, result_tx, make_generator)?;
        let workers = pool.num_workers();
        self.observer.on_started(workers, settings.target);

        advance(&mut phase, Phase::Collecting);
        let mut tally = Tally::new(settings.target);
        let termination = self.collect(&result_rx, &mut tally);

        advance(&mut phase, Phase::Stopping);
        pool.stop();
        drop(result_rx);
        let shutdown = pool.shutdown(settings.grace_period);
        if !shutdown.is_clean() {
            warn!(
                "{} worker(s) did not stop within {:?}",
                shutdown.abandoned, settings.grace_period
            );
        }
        debug!("shutdown: {:?}", shutdown);

        advance(&mut phase, Phase::Done);
        let (matches, stats) = tally
            .finish(settings.pattern.suffix(), workers)
            .ok_or(SearchError::NoMatches(termination))?;

        Ok(SearchOutcome {
            matches,
            stats,
            termination,
            shutdown,
        })
    }

    fn collect(&self, result_rx: &Receiver<MatchRecord>, tally: &mut Tally) -> Termination {
        let mut last_report = Instant::now();

        loop {
            if tally.is_complete() {
                return Termination::TargetReached;
            }
            if self.interrupt.load(Ordering::Relaxed) {
                return Termination::Interrupted;
            }

            match result_rx.recv_timeout(POLL_INTERVAL) {
                Ok(record) => {
                    let event = tally.record(record);
                    self.observer.on_match(&event);
                    last_report = Instant::now();
                }
                Err(RecvTimeoutError::Timeout) => {
                    if last_report.elapsed() >= self.settings.report_interval {
                        self.observer.on_heartbeat(&tally.progress());
                        last_report = Instant::now();
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    warn!(
                        "all workers exited with {}/{} mint(s) collected",
                        tally.len(),
                        self.settings.target
                    );
                    return Termination::WorkersExhausted;
                }
            }
        }
    }
}
