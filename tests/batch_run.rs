//! End-to-end batch run tests driven by a scripted in-memory store.
//!
//! These exercise the full pipeline (source, bounded queue, worker pool,
//! retry handling and coordinator accounting) without any real backing
//! resource.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use batchpool::{
    run, BackoffPolicy, BatchConfig, BatchEvent, BatchRunner, ConnectError, Job, OperationOutcome,
    ResourceConnector, ResourceHandle, RetryConfig,
};

/// In-memory store with per-job scripted outcomes and optional connect
/// failures. Jobs without a script succeed. Clones share state so tests can
/// inspect the operation log after a run.
#[derive(Clone, Default)]
struct MockStore {
    scripts: Arc<Mutex<HashMap<u64, Vec<OperationOutcome>>>>,
    connect_failures_remaining: Arc<Mutex<u32>>,
    performed: Arc<Mutex<Vec<u64>>>,
}

impl MockStore {
    fn reliable() -> Self {
        Self::default()
    }

    fn with_script(self, job_id: u64, outcomes: Vec<OperationOutcome>) -> Self {
        self.scripts.lock().unwrap().insert(job_id, outcomes);
        self
    }

    fn with_connect_failures(self, count: u32) -> Self {
        *self.connect_failures_remaining.lock().unwrap() = count;
        self
    }

    fn performed(&self) -> Vec<u64> {
        self.performed.lock().unwrap().clone()
    }
}

struct MockHandle {
    store: MockStore,
}

#[async_trait]
impl ResourceHandle for MockHandle {
    async fn perform(&mut self, job: &Job) -> OperationOutcome {
        self.store.performed.lock().unwrap().push(job.id);
        let mut scripts = self.store.scripts.lock().unwrap();
        match scripts.get_mut(&job.id) {
            Some(outcomes) if !outcomes.is_empty() => outcomes.remove(0),
            _ => OperationOutcome::Success,
        }
    }
}

#[async_trait]
impl ResourceConnector for MockStore {
    type Handle = MockHandle;

    async fn connect(&self) -> Result<MockHandle, ConnectError> {
        let mut remaining = self.connect_failures_remaining.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(ConnectError::new("mock://store/batch", "connection refused"));
        }
        Ok(MockHandle {
            store: self.clone(),
        })
    }

    fn describe(&self) -> String {
        "mock://store/batch".to_string()
    }
}

/// Run configuration with millisecond-scale backoff so retry paths stay fast.
fn fast_config(job_count: u64, worker_count: usize) -> BatchConfig {
    BatchConfig {
        worker_count,
        retry: RetryConfig {
            max_job_attempts: 3,
            max_connect_attempts: 2,
            backoff: BackoffPolicy {
                base_delay_ms: 1,
                max_delay_ms: 2,
                multiplier: 2.0,
            },
        },
        ..BatchConfig::new(job_count)
    }
}

#[tokio::test]
async fn test_all_jobs_succeed() {
    let store = MockStore::reliable();

    let statistics = run(10, 2, store.clone()).await.unwrap();

    assert_eq!(statistics.total, 10);
    assert_eq!(statistics.succeeded, 10);
    assert_eq!(statistics.failed, 0);
    assert!(statistics.failures.is_empty());

    // No retries: every id performed exactly once, ids are 0..10.
    let mut performed = store.performed();
    performed.sort_unstable();
    assert_eq!(performed, (0..10).collect::<Vec<u64>>());
}

#[tokio::test]
async fn test_transient_failure_is_retried_to_success() {
    let store = MockStore::reliable()
        .with_script(2, vec![OperationOutcome::TransientFailure]);

    let statistics = BatchRunner::new(fast_config(5, 1), store.clone())
        .run()
        .await
        .unwrap();

    // Job 2 resolves as a success after its retry; exactly five results.
    assert_eq!(statistics.total, 5);
    assert_eq!(statistics.succeeded, 5);
    assert_eq!(statistics.failed, 0);

    // The retried attempt carried the same job id.
    let performed = store.performed();
    assert_eq!(performed.len(), 6);
    assert_eq!(performed.iter().filter(|&&id| id == 2).count(), 2);
}

#[tokio::test]
async fn test_permanent_failure_is_recorded() {
    let store = MockStore::reliable()
        .with_script(1, vec![OperationOutcome::PermanentFailure("x".to_string())]);

    let statistics = BatchRunner::new(fast_config(3, 1), store)
        .run()
        .await
        .unwrap();

    assert_eq!(statistics.total, 3);
    assert_eq!(statistics.succeeded, 2);
    assert_eq!(statistics.failed, 1);
    assert_eq!(statistics.failures.len(), 1);
    assert_eq!(statistics.failures[0].job_id, 1);
    assert_eq!(statistics.failures[0].reason, "x");
}

#[tokio::test]
async fn test_conservation_across_many_workers() {
    let store = MockStore::reliable()
        .with_script(10, vec![OperationOutcome::TransientFailure])
        .with_script(20, vec![OperationOutcome::TransientFailure])
        .with_script(30, vec![OperationOutcome::TransientFailure])
        .with_script(5, vec![OperationOutcome::PermanentFailure("x".to_string())])
        .with_script(15, vec![OperationOutcome::PermanentFailure("x".to_string())]);

    let statistics = BatchRunner::new(fast_config(250, 8), store)
        .run()
        .await
        .unwrap();

    // Exactly one result per job, whatever mix of retries and failures.
    assert_eq!(statistics.succeeded + statistics.failed, 250);
    assert_eq!(statistics.succeeded, 248);
    assert_eq!(statistics.failed, 2);

    let mut failed_ids: Vec<u64> = statistics.failures.iter().map(|f| f.job_id).collect();
    failed_ids.sort_unstable();
    assert_eq!(failed_ids, vec![5, 15]);
}

#[tokio::test]
async fn test_retry_budget_exhaustion_fails_permanently() {
    // More transient failures than the attempt budget allows.
    let store = MockStore::reliable()
        .with_script(0, vec![OperationOutcome::TransientFailure; 10]);

    let statistics = BatchRunner::new(fast_config(2, 1), store)
        .run()
        .await
        .unwrap();

    assert_eq!(statistics.succeeded, 1);
    assert_eq!(statistics.failed, 1);
    assert_eq!(statistics.failures[0].job_id, 0);
    assert!(
        statistics.failures[0].reason.contains("retry limit exhausted"),
        "reason: {}",
        statistics.failures[0].reason
    );
}

#[tokio::test]
async fn test_unreachable_resource_terminates_every_job() {
    let store = MockStore::reliable().with_connect_failures(u32::MAX);

    let statistics = BatchRunner::new(fast_config(4, 2), store)
        .run()
        .await
        .unwrap();

    // The run still terminates with one result per job instead of retrying
    // the connection forever.
    assert_eq!(statistics.total, 4);
    assert_eq!(statistics.succeeded, 0);
    assert_eq!(statistics.failed, 4);
    for failure in &statistics.failures {
        assert!(
            failure.reason.contains("connection attempts exhausted"),
            "reason: {}",
            failure.reason
        );
    }
}

#[tokio::test]
async fn test_recovery_after_connect_failures() {
    // The first connect attempt fails; the bounded acquisition cycle retries
    // and the run completes cleanly.
    let store = MockStore::reliable().with_connect_failures(1);

    let statistics = BatchRunner::new(fast_config(6, 1), store)
        .run()
        .await
        .unwrap();

    assert_eq!(statistics.succeeded, 6);
    assert_eq!(statistics.failed, 0);
}

#[tokio::test]
async fn test_more_workers_than_jobs() {
    let store = MockStore::reliable();

    let statistics = BatchRunner::new(fast_config(1, 8), store)
        .run()
        .await
        .unwrap();

    assert_eq!(statistics.total, 1);
    assert_eq!(statistics.succeeded, 1);
}

#[tokio::test]
async fn test_event_stream_covers_progress_failures_and_completion() {
    let store = MockStore::reliable()
        .with_script(7, vec![OperationOutcome::PermanentFailure("boom".to_string())]);

    let runner = BatchRunner::new(fast_config(40, 4), store);
    let mut events = runner.subscribe();
    let statistics = runner.run().await.unwrap();

    let mut progress = Vec::new();
    let mut job_failures = Vec::new();
    let mut completed = None;

    while completed.is_none() {
        let published = events.recv().await.unwrap();
        match published.event {
            BatchEvent::Progress { percentage } => progress.push(percentage),
            BatchEvent::JobFailed {
                job_id,
                worker_id: _,
                reason,
            } => job_failures.push((job_id, reason)),
            BatchEvent::Completed { statistics: stats } => completed = Some(stats),
        }
    }

    // Thresholds 5..=100, strictly increasing, each exactly once.
    assert_eq!(progress, (5..=100).step_by(5).collect::<Vec<u8>>());

    assert_eq!(job_failures, vec![(7, "boom".to_string())]);

    let completed = completed.unwrap();
    assert_eq!(completed.succeeded, statistics.succeeded);
    assert_eq!(completed.failed, statistics.failed);
    assert_eq!(completed.total, 40);
}

#[tokio::test]
async fn test_invalid_configuration_is_rejected() {
    let store = MockStore::reliable();

    let result = BatchRunner::new(fast_config(0, 2), store).run().await;
    assert!(result.is_err());
}
