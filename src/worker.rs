//! # Worker Execution Loop
//!
//! Each worker pulls jobs from the shared queue, drives its own resource
//! connection, and publishes exactly one result per job at its terminal
//! state. Transient failures are retried synchronously within the worker's
//! own loop with a bounded attempt budget and backoff pacing, so in-flight
//! work is bounded by the worker count and no auxiliary dispatch can pile up
//! against a full queue.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::RetryConfig;
use crate::job::{Job, JobResult};
use crate::queue::{JobConsumer, ShutdownSignal};
use crate::resilience::BackoffPolicy;
use crate::resource::{Connection, OperationOutcome, ResourceConnector, ResourceHandle};

/// A single worker in the pool.
pub struct Worker<C: ResourceConnector> {
    id: usize,
    connection: Connection<C>,
    jobs: JobConsumer,
    results: mpsc::Sender<JobResult>,
    shutdown: ShutdownSignal,
    max_job_attempts: u32,
    backoff: BackoffPolicy,
    processed: u64,
}

impl<C: ResourceConnector> Worker<C> {
    pub fn new(
        id: usize,
        connector: Arc<C>,
        jobs: JobConsumer,
        results: mpsc::Sender<JobResult>,
        shutdown: ShutdownSignal,
        retry: &RetryConfig,
    ) -> Self {
        Self {
            id,
            connection: Connection::new(
                id,
                connector,
                retry.max_connect_attempts,
                retry.backoff.clone(),
            ),
            jobs,
            results,
            shutdown,
            max_job_attempts: retry.max_job_attempts,
            backoff: retry.backoff.clone(),
            processed: 0,
        }
    }

    /// Run until the job queue is closed and drained, or the shutdown signal
    /// fires. Returns the number of jobs this worker resolved.
    pub async fn run(mut self) -> u64 {
        debug!(worker_id = self.id, "Worker started");

        // Warm up the connection before pulling work. Failure here is not
        // fatal; each job re-attempts with its own connect budget.
        if let Err(error) = self.connection.acquire().await {
            warn!(
                worker_id = self.id,
                error = %error,
                "Starting without a resource connection"
            );
        }

        loop {
            let job = tokio::select! {
                job = self.jobs.recv() => match job {
                    Some(job) => job,
                    None => break,
                },
                _ = self.shutdown.wait() => break,
            };

            let result = self.process(job).await;
            if self.results.send(result).await.is_err() {
                warn!(worker_id = self.id, "Result channel closed; stopping worker");
                break;
            }
            self.processed += 1;
        }

        info!(
            worker_id = self.id,
            processed = self.processed,
            "Worker finished"
        );
        self.processed
    }

    /// Drive one job to its terminal state.
    ///
    /// Every path out of this function produces exactly one result: success,
    /// permanent failure from the operation itself, or permanent failure
    /// after a retry or connect budget is exhausted.
    async fn process(&mut self, job: Job) -> JobResult {
        let mut attempt: u32 = 1;

        loop {
            let outcome = {
                let handle = match self.connection.acquire().await {
                    Ok(handle) => handle,
                    Err(exhausted) => {
                        return JobResult::failed(job.id, self.id, exhausted.to_string());
                    }
                };
                handle.perform(&job).await
            };

            match outcome {
                OperationOutcome::Success => {
                    return JobResult::succeeded(job.id, self.id);
                }
                OperationOutcome::PermanentFailure(reason) => {
                    return JobResult::failed(job.id, self.id, reason);
                }
                OperationOutcome::TransientFailure => {
                    // The handle is no longer trusted after a transient
                    // failure; reconnect before the next attempt.
                    self.connection.mark_disconnected();

                    if attempt >= self.max_job_attempts {
                        return JobResult::failed(
                            job.id,
                            self.id,
                            format!("retry limit exhausted after {attempt} attempts"),
                        );
                    }

                    let delay = self.backoff.delay_for(attempt);
                    warn!(
                        worker_id = self.id,
                        job_id = job.id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Transient failure; retrying job"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
