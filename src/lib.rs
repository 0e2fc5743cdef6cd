#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Batchpool
//!
//! Bounded-queue worker pool for running a fixed batch of independent jobs
//! against an external data store, with transient-failure retry, progress
//! reporting and aggregate run statistics.
//!
//! ## Overview
//!
//! A run distributes jobs `0..job_count` across a fixed pool of workers
//! through a bounded job queue (the backpressure point). Each worker owns
//! its connection to the backing resource, retries transient failures with
//! bounded, backoff-paced attempts, and publishes exactly one result per
//! job. A coordinator consumes one result per job, announces progress in 5%
//! increments, aggregates failures, and signals shutdown once every job is
//! accounted for.
//!
//! The store protocol itself is not implemented here: callers provide a
//! [`ResourceConnector`] that opens connections and a [`ResourceHandle`]
//! that performs one operation per call and classifies failures as
//! transient or permanent.
//!
//! ## Module Organization
//!
//! - [`config`] - Run configuration, constructed explicitly at startup
//! - [`error`] - Structured error handling
//! - [`events`] - Run lifecycle event broadcasting
//! - [`job`] - Job and result records
//! - [`queue`] - Bounded queues and shutdown signalling
//! - [`resilience`] - Backoff pacing for retries and reconnects
//! - [`resource`] - The consumed resource-handle interface
//! - [`coordinator`] - Progress, failure aggregation and termination
//! - [`worker`] - The worker execution loop
//! - [`runner`] - Composition root for a run
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use batchpool::{
//!     run, ConnectError, Job, OperationOutcome, ResourceConnector, ResourceHandle,
//! };
//!
//! struct Store;
//! struct StoreHandle;
//!
//! #[async_trait]
//! impl ResourceHandle for StoreHandle {
//!     async fn perform(&mut self, _job: &Job) -> OperationOutcome {
//!         OperationOutcome::Success
//!     }
//! }
//!
//! #[async_trait]
//! impl ResourceConnector for Store {
//!     type Handle = StoreHandle;
//!
//!     async fn connect(&self) -> Result<StoreHandle, ConnectError> {
//!         Ok(StoreHandle)
//!     }
//!
//!     fn describe(&self) -> String {
//!         "memory://demo".to_string()
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! batchpool::logging::init_logging();
//!
//! let statistics = run(128_000, 8, Store).await?;
//! println!(
//!     "{} succeeded, {} failed in {:?}",
//!     statistics.succeeded, statistics.failed, statistics.elapsed
//! );
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod job;
pub mod logging;
pub mod queue;
pub mod resilience;
pub mod resource;
pub mod runner;
pub mod source;
pub mod worker;

pub use config::{BatchConfig, RetryConfig};
pub use coordinator::{Coordinator, RunStatistics};
pub use error::{BatchError, Result};
pub use events::{BatchEvent, EventPublisher, PublishedEvent};
pub use job::{FailureRecord, Job, JobOutcome, JobResult};
pub use queue::ShutdownSignal;
pub use resilience::BackoffPolicy;
pub use resource::{
    ConnectError, Connection, ConnectionExhausted, ConnectionState, OperationOutcome,
    ResourceConnector, ResourceHandle,
};
pub use runner::{run, BatchRunner};
pub use source::JobSource;
pub use worker::Worker;
