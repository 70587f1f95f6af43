//! # Differential Runner
//!
//! Feeds generated inputs to an experimental and a control backend and
//! records every disagreement.
//!
//! `DiffRunner` drives one pair of backends on the calling thread.
//! `ParallelDiff` builds one runner per worker thread, splits the iterations
//! between them, logs progress on an interval and merges the reports.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::compare::{compare, compare_lenient, Outcome};
use crate::errors::{CommunicationError, CommunicationResult, ComparisonError};
use crate::generator::InputGenerator;

/// Default worker count for parallel runs.
pub const DEFAULT_THREADS: usize = 4;

/// Default interval between progress lines.
pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

// =============================================================================
// REPORT
// =============================================================================

/// One input on which the backends disagreed.
#[derive(Debug, Clone)]
pub struct Mismatch {
    /// Precompile address.
    pub address: u8,
    /// The input both backends received.
    pub input: Vec<u8>,
    /// How they disagreed.
    pub error: ComparisonError,
}

/// Summary of a run.
///
/// Every input lands in exactly one bucket:
/// `agreed_ok + agreed_err + mismatches.len() == iterations`.
#[derive(Debug, Clone, Default)]
pub struct DiffReport {
    /// Calls made to each backend.
    pub iterations: u64,
    /// Inputs where both succeeded with equal output.
    pub agreed_ok: u64,
    /// Inputs where both failed and the comparison accepted it.
    pub agreed_err: u64,
    /// Every disagreement, in order.
    pub mismatches: Vec<Mismatch>,
}

impl DiffReport {
    /// Returns true if no disagreement was seen.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Fold another worker's report into this one.
    pub fn merge(&mut self, other: DiffReport) {
        self.iterations += other.iterations;
        self.agreed_ok += other.agreed_ok;
        self.agreed_err += other.agreed_err;
        self.mismatches.extend(other.mismatches);
    }
}

// =============================================================================
// RUNNER
// =============================================================================

/// Compares two backends on generated inputs.
pub struct DiffRunner {
    experimental: Box<dyn Backend>,
    control: Box<dyn Backend>,
    generator: InputGenerator,
    verbose_errors: bool,
    progress: Option<Arc<AtomicU64>>,
}

impl DiffRunner {
    /// Create a runner. Error messages are compared leniently by default.
    pub fn new(
        experimental: Box<dyn Backend>,
        control: Box<dyn Backend>,
        generator: InputGenerator,
    ) -> Self {
        Self {
            experimental,
            control,
            generator,
            verbose_errors: false,
            progress: None,
        }
    }

    /// Also report inputs where both sides failed with different messages.
    #[must_use]
    pub fn with_verbose_errors(mut self, verbose: bool) -> Self {
        self.verbose_errors = verbose;
        self
    }

    /// Bump `counter` after every compared input.
    #[must_use]
    pub fn with_progress(mut self, counter: Arc<AtomicU64>) -> Self {
        self.progress = Some(counter);
        self
    }

    /// Run `iterations` inputs against `address`.
    ///
    /// Precompile errors are part of the comparison. Any other backend
    /// failure aborts the run.
    pub fn run(&mut self, address: u8, iterations: u64) -> CommunicationResult<DiffReport> {
        if !self.control.supports(address) {
            warn!(
                "Control {} does not support 0x{:02x}",
                self.control.name(),
                address
            );
        }

        debug!(
            "Comparing {} against {} at 0x{:02x} ({} iterations)",
            self.experimental.name(),
            self.control.name(),
            address,
            iterations
        );

        let mut report = DiffReport::default();
        for i in 0..iterations {
            let input = self.generator.next_input(address);
            let left = outcome(self.experimental.run(address, &input))?;
            let right = outcome(self.control.run(address, &input))?;
            let both_ok = left.is_ok() && right.is_ok();

            let verdict = if self.verbose_errors {
                compare(left, right)
            } else {
                compare_lenient(left, right)
            };

            report.iterations += 1;
            match verdict {
                Ok(()) if both_ok => report.agreed_ok += 1,
                Ok(()) => report.agreed_err += 1,
                Err(error) => {
                    debug!("Mismatch at iteration {}: {}", i, error);
                    report.mismatches.push(Mismatch {
                        address,
                        input,
                        error,
                    });
                }
            }

            if let Some(counter) = &self.progress {
                counter.fetch_add(1, Ordering::Relaxed);
            }
        }

        debug!(
            "Finished: {} ok, {} err, {} mismatches",
            report.agreed_ok,
            report.agreed_err,
            report.mismatches.len()
        );
        Ok(report)
    }
}

/// Split a backend result into a comparable outcome or a hard failure.
fn outcome(result: CommunicationResult<Vec<u8>>) -> CommunicationResult<Outcome> {
    match result {
        Ok(bytes) => Ok(Ok(bytes)),
        Err(CommunicationError::Remote(msg)) => Ok(Err(msg)),
        Err(e) => Err(e),
    }
}

// =============================================================================
// PARALLEL RUNS
// =============================================================================

/// Per-worker iteration counts. Earlier workers take the remainder.
#[must_use]
pub fn split_iterations(iterations: u64, workers: usize) -> Vec<u64> {
    let workers = workers.max(1) as u64;
    let base = iterations / workers;
    let extra = iterations % workers;
    (0..workers).map(|w| base + u64::from(w < extra)).collect()
}

/// Runs one `DiffRunner` per worker thread and merges their reports.
#[derive(Debug, Clone, Copy)]
pub struct ParallelDiff {
    threads: usize,
    progress_interval: Duration,
}

impl ParallelDiff {
    /// Parallel run over `threads` workers (at least one).
    #[must_use]
    pub fn new(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
            progress_interval: PROGRESS_INTERVAL,
        }
    }

    /// Interval between progress lines.
    #[must_use]
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Worker count.
    #[must_use]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Run `iterations` inputs against `address` in total.
    ///
    /// `build(worker)` runs on the worker's own thread, so each worker owns
    /// its backends (and any spawned shim processes). The first worker
    /// error is returned after all workers have stopped.
    pub fn run<F, E>(&self, address: u8, iterations: u64, build: F) -> Result<DiffReport, E>
    where
        F: Fn(usize) -> Result<DiffRunner, E> + Sync,
        E: From<CommunicationError> + Send,
    {
        let counts = split_iterations(iterations, self.threads);
        let completed = Arc::new(AtomicU64::new(0));
        let (stop, stopped) = mpsc::channel::<()>();

        info!(
            "Comparing at 0x{:02x}: {} iterations over {} workers",
            address, iterations, self.threads
        );

        let results = thread::scope(|scope| {
            let progress = {
                let completed = Arc::clone(&completed);
                let interval = self.progress_interval;
                scope.spawn(move || log_progress(&completed, iterations, interval, stopped))
            };

            let workers: Vec<_> = counts
                .iter()
                .enumerate()
                .map(|(worker, &count)| {
                    let completed = Arc::clone(&completed);
                    let build = &build;
                    scope.spawn(move || -> Result<DiffReport, E> {
                        let mut runner = build(worker)?.with_progress(completed);
                        Ok(runner.run(address, count)?)
                    })
                })
                .collect();

            let results: Vec<_> = workers.into_iter().map(|handle| handle.join()).collect();
            drop(stop);
            let _ = progress.join();
            results
        });

        let mut merged = DiffReport::default();
        let mut failure = None;
        for result in results {
            match result {
                Ok(Ok(report)) => merged.merge(report),
                Ok(Err(e)) => {
                    failure.get_or_insert(e);
                }
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }

        if let Some(e) = failure {
            return Err(e);
        }

        info!(
            "Finished: {} ok, {} err, {} mismatches",
            merged.agreed_ok,
            merged.agreed_err,
            merged.mismatches.len()
        );
        Ok(merged)
    }
}

/// Log completed/total every `interval` until `stop` is dropped.
fn log_progress(completed: &AtomicU64, total: u64, interval: Duration, stop: Receiver<()>) {
    let started = Instant::now();
    while let Err(RecvTimeoutError::Timeout) = stop.recv_timeout(interval) {
        let done = completed.load(Ordering::Relaxed);
        let elapsed = started.elapsed().as_secs_f64();
        info!("Progress: {}/{} inputs ({:.1}/s)", done, total, done as f64 / elapsed);
    }
}
