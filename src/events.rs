//! # Run Event Publishing
//!
//! Broadcast channel carrying run lifecycle events to any observer (a CLI,
//! a logger, a test harness). Publishing never blocks the coordinator and a
//! run with no subscribers is valid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::coordinator::RunStatistics;

/// Events emitted over the lifetime of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BatchEvent {
    /// A new 5%-aligned completion threshold was crossed. Emitted once per
    /// threshold, in increasing order.
    Progress { percentage: u8 },
    /// A job terminated as a permanent failure.
    JobFailed {
        job_id: u64,
        worker_id: usize,
        reason: String,
    },
    /// The run finished; every job is accounted for.
    Completed { statistics: RunStatistics },
}

/// An event that has been published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedEvent {
    pub event: BatchEvent,
    pub published_at: DateTime<Utc>,
}

/// Broadcast publisher for run events.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<PublishedEvent>,
}

impl EventPublisher {
    /// Create a new event publisher with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event.
    ///
    /// A send with no subscribers is not an error; events are emitted whether
    /// or not anyone is listening.
    pub fn publish(&self, event: BatchEvent) {
        let published = PublishedEvent {
            event,
            published_at: Utc::now(),
        };
        let _ = self.sender.send(published);
    }

    /// Subscribe to events.
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(1024)
    }
}
