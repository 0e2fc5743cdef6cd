//! Run configuration, constructed explicitly at startup and passed into the
//! runner by value. No global mutable state.

use crate::error::{BatchError, Result};
use crate::resilience::BackoffPolicy;
use serde::{Deserialize, Serialize};

/// Configuration for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of jobs to generate and process.
    pub job_count: u64,
    /// Number of worker tasks to spawn.
    pub worker_count: usize,
    /// Job queue capacity; the backpressure point for the job source.
    pub queue_capacity: usize,
    /// Result queue capacity between workers and the coordinator.
    pub result_capacity: usize,
    /// Event broadcast channel capacity.
    pub event_capacity: usize,
    pub retry: RetryConfig,
}

/// Retry budgets and pacing for transient failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum operation attempts per job before it is terminated as a
    /// permanent failure.
    pub max_job_attempts: u32,
    /// Maximum connection attempts per acquisition cycle.
    pub max_connect_attempts: u32,
    pub backoff: BackoffPolicy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_job_attempts: 5,
            max_connect_attempts: 5,
            backoff: BackoffPolicy::default(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            job_count: 0,
            worker_count: default_worker_count(),
            queue_capacity: 512,
            result_capacity: 512,
            event_capacity: 1024,
            retry: RetryConfig::default(),
        }
    }
}

/// One worker per available processing unit.
fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}

impl BatchConfig {
    /// Default configuration for the given number of jobs.
    pub fn new(job_count: u64) -> Self {
        Self {
            job_count,
            ..Self::default()
        }
    }

    /// Apply environment-variable overrides on top of the current values.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(jobs) = std::env::var("BATCHPOOL_JOBS") {
            config.job_count = jobs
                .parse()
                .map_err(|e| BatchError::Configuration(format!("Invalid job_count: {e}")))?;
        }

        if let Ok(workers) = std::env::var("BATCHPOOL_WORKERS") {
            config.worker_count = workers
                .parse()
                .map_err(|e| BatchError::Configuration(format!("Invalid worker_count: {e}")))?;
        }

        if let Ok(capacity) = std::env::var("BATCHPOOL_QUEUE_CAPACITY") {
            config.queue_capacity = capacity
                .parse()
                .map_err(|e| BatchError::Configuration(format!("Invalid queue_capacity: {e}")))?;
        }

        if let Ok(attempts) = std::env::var("BATCHPOOL_MAX_JOB_ATTEMPTS") {
            config.retry.max_job_attempts = attempts
                .parse()
                .map_err(|e| BatchError::Configuration(format!("Invalid max_job_attempts: {e}")))?;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.job_count == 0 {
            return Err(BatchError::Configuration(
                "job_count must be greater than 0".to_string(),
            ));
        }
        if self.worker_count == 0 {
            return Err(BatchError::Configuration(
                "worker_count must be greater than 0".to_string(),
            ));
        }
        if self.queue_capacity == 0 || self.result_capacity == 0 {
            return Err(BatchError::Configuration(
                "queue capacities must be greater than 0".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(BatchError::Configuration(
                "event_capacity must be greater than 0".to_string(),
            ));
        }
        if self.retry.max_job_attempts == 0 || self.retry.max_connect_attempts == 0 {
            return Err(BatchError::Configuration(
                "retry attempt budgets must be greater than 0".to_string(),
            ));
        }
        if self.retry.backoff.multiplier < 1.0 {
            return Err(BatchError::Configuration(
                "backoff multiplier must be at least 1.0".to_string(),
            ));
        }
        Ok(())
    }
}
