//! Error types for the signed client.

use thiserror::Error;

/// Failures from the exchange API boundary.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request signing failed: {0}")]
    Signing(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status. Carries the exchange's error payload
    /// verbatim so the webhook response can pass it through.
    #[error("Exchange rejected request: HTTP {status}: {body}")]
    Exchange {
        status: u16,
        body: serde_json::Value,
    },

    #[error("Unexpected response shape: {0}")]
    Response(String),
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
