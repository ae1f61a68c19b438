//! Error types for the cron-scheduling service adapter.

use thiserror::Error;

/// Errors that can occur when talking to the scheduling service.
#[derive(Debug, Error)]
pub enum CronError {
    /// HTTP transport failed (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The service answered with a non-success status.
    #[error("scheduling service error ({status}): {body}")]
    Api { status: u16, body: String },
}

impl CronError {
    /// Whether the failure means the service is unreachable or degraded, as
    /// opposed to having rejected the request.
    pub fn is_unavailable(&self) -> bool {
        match self {
            CronError::Http(_) => true,
            CronError::Api { status, .. } => *status >= 500,
            CronError::Json(_) => false,
        }
    }
}
