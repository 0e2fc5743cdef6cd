//! Structured error handling for batch runs.

use thiserror::Error;

/// Errors surfaced by the batch runner and coordinator.
///
/// Operation-level failures (transient or permanent) never appear here; they
/// are carried per job as [`crate::JobOutcome`] values. This type covers the
/// run itself failing to start or to account for every job.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The result channel closed before every job was accounted for. This
    /// means every worker stopped early, which breaks the conservation
    /// guarantee of one result per job.
    #[error("Result channel closed after {received} of {expected} results")]
    ResultChannelClosed { received: u64, expected: u64 },
}

pub type Result<T> = std::result::Result<T, BatchError>;
