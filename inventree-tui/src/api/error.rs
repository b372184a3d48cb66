//! Errors raised by the remote inventory API layer

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection refused, TLS, timeout, ...)
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Server answered but the payload was not what we expected
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Server understood the request and refused it
    #[error("{0}")]
    Rejected(String),
}
