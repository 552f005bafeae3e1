//! Worker pool management.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use log::{error, warn};

use crate::crypto::KeyGenerator;
use crate::matcher::SuffixPattern;

use super::cpu::{CpuWorker, WorkerExit};
use super::{MatchRecord, SearchError};

/// Interval between liveness checks while waiting for workers to exit.
const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// How the workers ended during shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Workers that exited within the grace period
    pub stopped: usize,
    /// Of those, workers that had already given up on a generation error
    pub failed: usize,
    /// Workers whose thread panicked
    pub panicked: usize,
    /// Workers still running at the deadline, detached from the pool
    pub abandoned: usize,
}

impl ShutdownReport {
    /// Returns true if every worker was accounted for without detaching.
    pub fn is_clean(&self) -> bool {
        self.abandoned == 0
    }
}

struct WorkerHandle {
    id: usize,
    handle: JoinHandle<WorkerExit>,
}

/// Owns the worker threads and the stop flag they share.
pub struct WorkerPool {
    /// Running worker threads
    handles: Vec<WorkerHandle>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
}

impl WorkerPool {
    /// Spawns `num_workers` worker threads.
    ///
    /// `make_generator` is called once per worker id so each worker owns an
    /// independent generator. A worker whose thread cannot be spawned is
    /// skipped; the pool fails only if no worker starts at all.
    pub fn spawn<G, F>(
        num_workers: usize,
        pattern: &SuffixPattern,
        result_tx: Sender<MatchRecord>,
        mut make_generator: F,
    ) -> Result<Self, SearchError>
    where
        G: KeyGenerator + 'static,
        F: FnMut(usize) -> G,
    {
        if num_workers == 0 {
            return Err(SearchError::NoWorkers);
        }

        let stop_flag = Arc::new(AtomicBool::new(false));
        let mut handles = Vec::with_capacity(num_workers);
        let mut last_error: Option<io::Error> = None;

        for id in 0..num_workers {
            let worker = CpuWorker::new(
                id,
                pattern.clone(),
                make_generator(id),
                result_tx.clone(),
                stop_flag.clone(),
            );

            match thread::Builder::new()
                .name(format!("vanity-worker-{}", id))
                .spawn(move || worker.run())
            {
                Ok(handle) => handles.push(WorkerHandle { id, handle }),
                Err(e) => {
                    error!("failed to spawn worker {}: {}", id, e);
                    last_error = Some(e);
                }
            }
        }

        if handles.is_empty() {
            let e = last_error
                .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "no worker started"));
            return Err(SearchError::Spawn(e));
        }

        if handles.len() < num_workers {
            warn!(
                "only {} of {} workers started",
                handles.len(),
                num_workers
            );
        }

        Ok(Self { handles, stop_flag })
    }

    /// Signals all workers to stop.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Returns true if the pool has been signaled to stop.
    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }

    /// Returns the number of running workers.
    pub fn num_workers(&self) -> usize {
        self.handles.len()
    }

    /// Stops the workers and waits for them until `grace_period` elapses.
    ///
    /// All workers share one deadline. Any worker still running at the
    /// deadline is detached: its handle is released, the stop flag stays set,
    /// and the thread is reclaimed when the process exits.
    pub fn shutdown(mut self, grace_period: Duration) -> ShutdownReport {
        self.stop();

        let deadline = Instant::now() + grace_period;
        let mut report = ShutdownReport::default();

        for worker in self.handles.drain(..) {
            while !worker.handle.is_finished() && Instant::now() < deadline {
                thread::sleep(JOIN_POLL_INTERVAL);
            }

            if !worker.handle.is_finished() {
                warn!(
                    "worker {} did not stop within {:?}, detaching it",
                    worker.id, grace_period
                );
                report.abandoned += 1;
                continue;
            }

            match worker.handle.join() {
                Ok(WorkerExit::Failed(_)) => {
                    report.stopped += 1;
                    report.failed += 1;
                }
                Ok(_) => report.stopped += 1,
                Err(_) => {
                    error!("worker {} panicked", worker.id);
                    report.panicked += 1;
                }
            }
        }

        report
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Workers left in the pool are detached, never joined here.
        self.stop();
    }
}
