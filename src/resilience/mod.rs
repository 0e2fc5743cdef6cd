//! # Resilience Module
//!
//! Retry pacing for transient-failure recovery. The backoff policy here
//! bounds both resource reconnection attempts and per-job retry attempts,
//! replacing unbounded retry loops with a capped, exponentially paced cycle.
//!
//! ## Usage
//!
//! ```rust
//! use batchpool::resilience::BackoffPolicy;
//!
//! let policy = BackoffPolicy::default();
//! let delay = policy.delay_for(3); // third failed attempt
//! assert!(delay <= std::time::Duration::from_millis(policy.max_delay_ms));
//! ```

pub mod backoff;

pub use backoff::BackoffPolicy;
