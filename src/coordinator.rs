//! # Run Coordinator
//!
//! Consumes exactly one result per job, announces completion percentage in
//! 5% increments, aggregates permanent failures, and signals shutdown once
//! every job is accounted for. The coordinator is the only component that
//! decides a run is over; workers observe its shutdown signal rather than
//! inferring termination from queue state.

use std::time::{Duration, Instant};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::{BatchError, Result};
use crate::events::{BatchEvent, EventPublisher};
use crate::job::{FailureRecord, JobOutcome, JobResult};
use crate::queue::ShutdownSignal;

/// Aggregate statistics for a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub elapsed: Duration,
    pub average_per_job: Duration,
    /// Permanent failures in the order the coordinator observed them.
    pub failures: Vec<FailureRecord>,
}

/// Watermark over the 5%-aligned progress thresholds.
///
/// `advance` returns every threshold newly crossed by the given consumed
/// count, so all twenty thresholds are announced exactly once and in order
/// even when the job count is smaller than twenty.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    total: u64,
    announced: u8,
}

impl ProgressTracker {
    pub(crate) fn new(total: u64) -> Self {
        Self {
            total,
            announced: 0,
        }
    }

    /// Thresholds newly crossed after `consumed` results (1-based).
    pub(crate) fn advance(&mut self, consumed: u64) -> Vec<u8> {
        let percentage = (consumed.saturating_mul(100)).div_ceil(self.total).min(100) as u8;
        let mut crossed = Vec::new();
        while self.announced + 5 <= percentage {
            self.announced += 5;
            crossed.push(self.announced);
        }
        crossed
    }
}

/// Consumes results, tracks progress and failures, and terminates the run.
pub struct Coordinator {
    job_count: u64,
    results: mpsc::Receiver<JobResult>,
    events: EventPublisher,
    shutdown: ShutdownSignal,
}

impl Coordinator {
    pub fn new(
        job_count: u64,
        results: mpsc::Receiver<JobResult>,
        events: EventPublisher,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            job_count,
            results,
            events,
            shutdown,
        }
    }

    /// Consume exactly `job_count` results, then signal shutdown and report.
    pub async fn run(mut self) -> Result<RunStatistics> {
        info!(job_count = self.job_count, "Coordinator running");
        let started = Instant::now();
        let mut progress = ProgressTracker::new(self.job_count);
        let mut succeeded: u64 = 0;
        let mut failed: u64 = 0;
        let mut failures: Vec<FailureRecord> = Vec::new();

        for consumed in 1..=self.job_count {
            let result = match self.results.recv().await {
                Some(result) => result,
                None => {
                    // Every worker stopped before the run was accounted for.
                    self.shutdown.trigger();
                    return Err(BatchError::ResultChannelClosed {
                        received: consumed - 1,
                        expected: self.job_count,
                    });
                }
            };

            for percentage in progress.advance(consumed) {
                info!(percentage, "Processing {percentage}% complete");
                self.events.publish(BatchEvent::Progress { percentage });
            }

            match result.outcome {
                JobOutcome::Success => succeeded += 1,
                JobOutcome::Failure { reason } => {
                    failed += 1;
                    warn!(
                        job_id = result.job_id,
                        worker_id = result.worker_id,
                        reason = %reason,
                        "Job {} failed on worker {} ({})",
                        result.job_id,
                        result.worker_id,
                        reason
                    );
                    self.events.publish(BatchEvent::JobFailed {
                        job_id: result.job_id,
                        worker_id: result.worker_id,
                        reason: reason.clone(),
                    });
                    failures.push(FailureRecord {
                        job_id: result.job_id,
                        worker_id: result.worker_id,
                        reason,
                    });
                }
            }
        }

        info!("Closing job queue and terminating workers");
        self.shutdown.trigger();

        let elapsed = started.elapsed();
        let average_per_job = elapsed.div_f64(self.job_count as f64);
        let statistics = RunStatistics {
            total: self.job_count,
            succeeded,
            failed,
            elapsed,
            average_per_job,
            failures,
        };

        info!(
            succeeded,
            failed,
            elapsed_ms = elapsed.as_millis() as u64,
            "✅ All jobs completed in {:?} ({:?} per job)",
            elapsed,
            average_per_job
        );
        self.events.publish(BatchEvent::Completed {
            statistics: statistics.clone(),
        });

        Ok(statistics)
    }
}
