//! Error types for reconciliation.

use deltaflip_client::ClientError;
use thiserror::Error;

/// Failures from handling one signal.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Another signal is still being handled. Surfaced as HTTP 429;
    /// the overlapping signal is dropped, not queued.
    #[error("A reconciliation is already in progress")]
    Busy,

    /// Exchange call failed. Never retried here.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Result type alias for reconciler operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;
