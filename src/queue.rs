//! # Bounded Queues and Shutdown Signalling
//!
//! The job queue is a bounded FIFO shared by all workers: a single producer
//! (the job source) pushes onto a bounded channel, and every worker pulls
//! from a shared receiver. Pushing suspends when the queue is full, which is
//! the system's backpressure point; pulling suspends when it is empty.
//!
//! Termination is signalled two ways: the queue closes once the producer is
//! dropped (workers drain whatever remains and observe end-of-stream), and
//! the coordinator fires an explicit [`ShutdownSignal`] once every job is
//! accounted for, so shutdown does not depend on queue semantics alone.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, Notify};

use crate::job::Job;

/// Create a bounded job queue with the given capacity.
pub fn bounded(capacity: usize) -> (JobProducer, JobConsumer) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        JobProducer { tx },
        JobConsumer {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

/// Producing side of the job queue. Owned by the job source; dropping it
/// closes the queue once the buffered jobs are drained.
#[derive(Debug)]
pub struct JobProducer {
    tx: mpsc::Sender<Job>,
}

impl JobProducer {
    /// Push a job, suspending while the queue is full (backpressure).
    ///
    /// Returns `Err` with the rejected job if every consumer is gone.
    pub async fn push(&self, job: Job) -> std::result::Result<(), Job> {
        self.tx.send(job).await.map_err(|rejected| rejected.0)
    }
}

/// Consuming side of the job queue, shared by all workers.
#[derive(Debug, Clone)]
pub struct JobConsumer {
    rx: Arc<Mutex<mpsc::Receiver<Job>>>,
}

impl JobConsumer {
    /// Receive the next job, suspending while the queue is empty.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub async fn recv(&self) -> Option<Job> {
        self.rx.lock().await.recv().await
    }
}

/// Explicit run-termination signal observed by all workers.
///
/// Triggered by the coordinator after it has consumed one result per job.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    triggered: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }

    /// Wait until the signal is triggered. Returns immediately if it already
    /// has been.
    pub async fn wait(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register interest before checking the flag so a trigger between the
        // check and the await cannot be missed.
        notified.as_mut().enable();
        if self.is_triggered() {
            return;
        }
        notified.await;
    }
}
