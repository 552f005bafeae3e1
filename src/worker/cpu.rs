//! CPU-based worker for vanity mint generation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{SendTimeoutError, Sender};
use log::{debug, error};

use crate::crypto::{KeyGenerator, KeygenError};
use crate::matcher::SuffixPattern;

use super::MatchRecord;

/// Attempts between two reads of the stop flag.
const STOP_CHECK_INTERVAL: u32 = 256;

/// How long a single send waits on a full channel before re-checking the stop flag.
const SEND_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Why a worker loop ended.
#[derive(Debug)]
pub enum WorkerExit {
    /// The stop flag was observed
    Stopped,
    /// The coordinator dropped the result channel
    Disconnected,
    /// Key generation failed; the worker gave up
    Failed(KeygenError),
}

/// A CPU worker that generates and tests keypairs.
pub struct CpuWorker<G> {
    /// Worker ID
    id: usize,
    /// The suffix to match against
    pattern: SuffixPattern,
    /// Source of candidate keypairs, owned by this worker
    generator: G,
    /// Channel to send results
    result_tx: Sender<MatchRecord>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
}

impl<G: KeyGenerator> CpuWorker<G> {
    /// Creates a new CPU worker.
    pub fn new(
        id: usize,
        pattern: SuffixPattern,
        generator: G,
        result_tx: Sender<MatchRecord>,
        stop_flag: Arc<AtomicBool>,
    ) -> Self {
        Self {
            id,
            pattern,
            generator,
            result_tx,
            stop_flag,
        }
    }

    /// Runs the worker loop.
    ///
    /// Generates keypairs and tests them against the suffix until:
    /// - Stop flag is set
    /// - Channel is closed
    /// - Key generation fails
    ///
    /// Every match is sent through the channel, after which the attempt
    /// counter and timer start over.
    pub fn run(mut self) -> WorkerExit {
        let mut attempts: u64 = 0;
        let mut since = Instant::now();

        loop {
            if self.is_stopped() {
                debug!("worker {} stopping", self.id);
                return WorkerExit::Stopped;
            }

            for _ in 0..STOP_CHECK_INTERVAL {
                let keypair = match self.generator.generate() {
                    Ok(keypair) => keypair,
                    Err(e) => {
                        error!("worker {}: key generation failed: {}", self.id, e);
                        return WorkerExit::Failed(e);
                    }
                };
                attempts += 1;

                if !self.pattern.matches(keypair.address().as_str()) {
                    continue;
                }

                let record = MatchRecord::new(self.id, keypair, attempts, since.elapsed());
                if let Some(exit) = self.deliver(record) {
                    return exit;
                }

                attempts = 0;
                since = Instant::now();
            }
        }
    }

    /// Sends a record, retrying while the channel is full.
    ///
    /// Returns an exit reason if the worker must stop instead.
    fn deliver(&self, mut record: MatchRecord) -> Option<WorkerExit> {
        loop {
            match self.result_tx.send_timeout(record, SEND_RETRY_INTERVAL) {
                Ok(()) => return None,
                Err(SendTimeoutError::Timeout(unsent)) => {
                    if self.is_stopped() {
                        debug!("worker {} stopping with an undelivered match", self.id);
                        return Some(WorkerExit::Stopped);
                    }
                    record = unsent;
                }
                Err(SendTimeoutError::Disconnected(_)) => {
                    debug!("worker {}: result channel closed", self.id);
                    return Some(WorkerExit::Disconnected);
                }
            }
        }
    }

    #[inline]
    fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }

    /// Returns the worker ID.
    pub fn id(&self) -> usize {
        self.id
    }
}
