//! Error types for the LinkedIn client.

use thiserror::Error;

/// Errors that can occur when interacting with LinkedIn.
#[derive(Debug, Error)]
pub enum LinkedinError {
    /// Token exchange failed; re-authentication is the only fix.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API answered with a non-success status. `body` is the platform's
    /// error payload, verbatim.
    #[error("LinkedIn API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Response shape did not match expectations.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
