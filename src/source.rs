//! Job source: generates the bounded, ordered job sequence onto the job
//! queue from its own task, so that queue-full blocking applies backpressure
//! without deadlocking workers or the coordinator.

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::job::Job;
use crate::queue::JobProducer;

/// Generates jobs with ids `0..job_count` in increasing order.
#[derive(Debug)]
pub struct JobSource {
    job_count: u64,
    producer: JobProducer,
}

impl JobSource {
    pub fn new(job_count: u64, producer: JobProducer) -> Self {
        Self {
            job_count,
            producer,
        }
    }

    /// Spawn the generation task. The producer is dropped when generation
    /// finishes, which closes the job queue once workers drain it.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            for id in 0..self.job_count {
                if self.producer.push(Job::new(id)).await.is_err() {
                    warn!(job_id = id, "Job queue closed before generation finished");
                    return;
                }
            }
            debug!(job_count = self.job_count, "Job generation complete");
        })
    }
}
