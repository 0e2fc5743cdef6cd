//! Job and result records exchanged between the source, workers and the
//! coordinator.

use serde::{Deserialize, Serialize};

/// A unit of work identified by an integer id.
///
/// Created once by the job source and never mutated. A retried job carries
/// the same id as its original submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
}

impl Job {
    pub fn new(id: u64) -> Self {
        Self { id }
    }
}

/// Terminal outcome of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobOutcome {
    Success,
    Failure { reason: String },
}

/// Terminal outcome record for a job, tagged with the worker that resolved it.
///
/// Exactly one result is emitted per job id, regardless of how many retry
/// attempts preceded it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    pub job_id: u64,
    pub worker_id: usize,
    pub outcome: JobOutcome,
}

impl JobResult {
    pub fn succeeded(job_id: u64, worker_id: usize) -> Self {
        Self {
            job_id,
            worker_id,
            outcome: JobOutcome::Success,
        }
    }

    pub fn failed(job_id: u64, worker_id: usize, reason: impl Into<String>) -> Self {
        Self {
            job_id,
            worker_id,
            outcome: JobOutcome::Failure {
                reason: reason.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, JobOutcome::Success)
    }
}

/// A permanently failed job as recorded by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub job_id: u64,
    pub worker_id: usize,
    pub reason: String,
}
