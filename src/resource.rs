//! # Resource Handle Interface
//!
//! The consumed capability for performing one operation per call against the
//! backing data store. The crate implements no store protocol of its own;
//! workers depend on two traits and on the transient/permanent classification
//! of operation failures.
//!
//! [`Connection`] wraps a connector with the worker-owned acquisition state
//! machine: `Disconnected → Connecting → Connected`, falling back to
//! `Disconnected` on failure. Acquisition is bounded by a connect-attempt
//! budget and paced by exponential backoff; every attempt is logged.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::job::Job;
use crate::resilience::BackoffPolicy;

/// Outcome of a single operation attempt against the backing resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    Success,
    /// Recoverable failure: the resource is temporarily unavailable (e.g. the
    /// connection dropped mid-operation). The worker retries the same job.
    TransientFailure,
    /// Non-recoverable failure for this job. Surfaced once as a failure
    /// result; the run continues.
    PermanentFailure(String),
}

/// Error returned by a single connection attempt.
#[derive(Debug, Error)]
#[error("unable to connect to {target}: {message}")]
pub struct ConnectError {
    pub target: String,
    pub message: String,
}

impl ConnectError {
    pub fn new(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            message: message.into(),
        }
    }
}

/// A live handle to the backing resource, exclusively owned by one worker.
#[async_trait]
pub trait ResourceHandle: Send {
    /// Perform one operation for the given job and classify the result.
    async fn perform(&mut self, job: &Job) -> OperationOutcome;
}

/// Opens connections to the backing resource.
///
/// `connect` makes exactly one attempt; bounded retry with backoff is the
/// caller's ([`Connection`]) responsibility.
#[async_trait]
pub trait ResourceConnector: Send + Sync + 'static {
    type Handle: ResourceHandle;

    async fn connect(&self) -> std::result::Result<Self::Handle, ConnectError>;

    /// Human-readable resource location, used in connection logging.
    fn describe(&self) -> String;
}

/// Connection lifecycle states for a worker-owned handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Raised when an acquisition cycle runs out of connect attempts.
#[derive(Debug, Error)]
#[error("connection attempts exhausted after {attempts} tries to {target}")]
pub struct ConnectionExhausted {
    pub attempts: u32,
    pub target: String,
}

/// A worker-owned connection to the backing resource.
///
/// Handles are never shared or migrated between workers; each worker drives
/// its own `Connection` through the acquisition state machine.
pub struct Connection<C: ResourceConnector> {
    worker_id: usize,
    connector: Arc<C>,
    state: ConnectionState,
    handle: Option<C::Handle>,
    max_attempts: u32,
    backoff: BackoffPolicy,
}

impl<C: ResourceConnector> Connection<C> {
    pub fn new(
        worker_id: usize,
        connector: Arc<C>,
        max_attempts: u32,
        backoff: BackoffPolicy,
    ) -> Self {
        Self {
            worker_id,
            connector,
            state: ConnectionState::Disconnected,
            handle: None,
            max_attempts,
            backoff,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Drop the current handle after a transient operation failure. The next
    /// [`Connection::acquire`] starts a fresh acquisition cycle.
    pub fn mark_disconnected(&mut self) {
        if self.handle.take().is_some() {
            debug!(worker_id = self.worker_id, "Resource connection dropped");
        }
        self.state = ConnectionState::Disconnected;
    }

    /// Return the live handle, establishing a connection first if needed.
    pub async fn acquire(
        &mut self,
    ) -> std::result::Result<&mut C::Handle, ConnectionExhausted> {
        if self.handle.is_none() {
            let handle = self.establish().await?;
            self.handle = Some(handle);
        }
        match self.handle.as_mut() {
            Some(handle) => Ok(handle),
            None => unreachable!("connection slot filled above"),
        }
    }

    /// One bounded, backoff-paced acquisition cycle.
    async fn establish(&mut self) -> std::result::Result<C::Handle, ConnectionExhausted> {
        self.state = ConnectionState::Connecting;
        let target = self.connector.describe();

        for attempt in 1..=self.max_attempts {
            info!(
                worker_id = self.worker_id,
                attempt,
                target = %target,
                "Connecting to resource"
            );

            match self.connector.connect().await {
                Ok(handle) => {
                    self.state = ConnectionState::Connected;
                    debug!(worker_id = self.worker_id, attempt, "Resource connection established");
                    return Ok(handle);
                }
                Err(error) => {
                    warn!(
                        worker_id = self.worker_id,
                        attempt,
                        error = %error,
                        "Unable to connect to resource"
                    );
                    if attempt < self.max_attempts {
                        sleep(self.backoff.delay_for(attempt)).await;
                    }
                }
            }
        }

        self.state = ConnectionState::Disconnected;
        Err(ConnectionExhausted {
            attempts: self.max_attempts,
            target,
        })
    }
}
