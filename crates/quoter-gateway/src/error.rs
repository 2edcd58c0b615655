//! Gateway error taxonomy.
//!
//! Nothing here is fatal to the process: transient errors are retried on
//! the next tick and rejections retry naturally with fresh balances.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Network failure, timeout, or 5xx from the venue.
    #[error("transport error: {0}")]
    Transport(String),

    /// The venue processed the request and said no (insufficient balance,
    /// invalid price, unknown order, ...).
    #[error("exchange rejected request: status {status}, {message}")]
    Rejected { status: i64, message: String },

    /// Response body could not be decoded into the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Request signing or credential failure.
    #[error("authentication failed: {0}")]
    Auth(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Malformed(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
