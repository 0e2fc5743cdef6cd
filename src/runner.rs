//! # Batch Runner
//!
//! Composition root for a run: validates configuration, wires the bounded
//! queues and shutdown signal, spawns the job source and the worker pool,
//! and drives the coordinator to completion.

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::BatchConfig;
use crate::coordinator::{Coordinator, RunStatistics};
use crate::error::Result;
use crate::events::{EventPublisher, PublishedEvent};
use crate::queue::{self, ShutdownSignal};
use crate::resource::ResourceConnector;
use crate::source::JobSource;
use crate::worker::Worker;

/// Runs a fixed batch of jobs across a pool of workers.
pub struct BatchRunner<C: ResourceConnector> {
    id: Uuid,
    config: BatchConfig,
    connector: Arc<C>,
    events: EventPublisher,
}

impl<C: ResourceConnector> BatchRunner<C> {
    pub fn new(config: BatchConfig, connector: C) -> Self {
        let events = EventPublisher::new(config.event_capacity);
        Self {
            id: Uuid::new_v4(),
            config,
            connector: Arc::new(connector),
            events,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Subscribe to run events before starting the run.
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.events.subscribe()
    }

    /// Execute the batch to completion and return its statistics.
    pub async fn run(self) -> Result<RunStatistics> {
        self.config.validate()?;

        info!(
            run_id = %self.id,
            "🚀 BATCH: Running {} jobs across {} workers",
            self.config.job_count,
            self.config.worker_count
        );
        debug!(
            "Configuration: {}",
            serde_json::to_string_pretty(&self.config)
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );

        let (producer, consumer) = queue::bounded(self.config.queue_capacity);
        let (result_tx, result_rx) = mpsc::channel(self.config.result_capacity);
        let shutdown = ShutdownSignal::new();

        let mut worker_handles = Vec::with_capacity(self.config.worker_count);
        for worker_id in 0..self.config.worker_count {
            let worker = Worker::new(
                worker_id,
                Arc::clone(&self.connector),
                consumer.clone(),
                result_tx.clone(),
                shutdown.clone(),
                &self.config.retry,
            );
            worker_handles.push(tokio::spawn(worker.run()));
        }
        // Workers hold the only senders now; if every worker stops early the
        // coordinator observes a closed result channel instead of hanging.
        drop(result_tx);

        let source_handle = JobSource::new(self.config.job_count, producer).spawn();

        let coordinator = Coordinator::new(
            self.config.job_count,
            result_rx,
            self.events.clone(),
            shutdown.clone(),
        );
        let statistics = match coordinator.run().await {
            Ok(statistics) => statistics,
            Err(error) => {
                shutdown.trigger();
                source_handle.abort();
                return Err(error);
            }
        };

        // Workers observe the shutdown signal (or the drained, closed queue)
        // and exit; join them to collect per-worker counts.
        for (worker_id, joined) in futures::future::join_all(worker_handles)
            .await
            .into_iter()
            .enumerate()
        {
            match joined {
                Ok(processed) => debug!(worker_id, processed, "Worker joined"),
                Err(error) => warn!(worker_id, error = %error, "Worker task failed"),
            }
        }
        if let Err(error) = source_handle.await {
            warn!(error = %error, "Job source task failed");
        }

        info!(
            run_id = %self.id,
            succeeded = statistics.succeeded,
            failed = statistics.failed,
            "✅ BATCH: Run complete in {:?} ({:?} per job)",
            statistics.elapsed,
            statistics.average_per_job
        );

        Ok(statistics)
    }
}

/// Run a batch with default configuration.
///
/// The full surface (queue capacities, retry budgets, backoff pacing and
/// event subscription) is available through [`BatchRunner`].
pub async fn run<C: ResourceConnector>(
    job_count: u64,
    worker_count: usize,
    connector: C,
) -> Result<RunStatistics> {
    let config = BatchConfig {
        worker_count,
        ..BatchConfig::new(job_count)
    };
    BatchRunner::new(config, connector).run().await
}
