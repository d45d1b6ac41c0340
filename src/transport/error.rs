//! Transport error types.
//!
//! Every variant is fatal to the operation that produced it; there is no
//! transient/permanent split because nothing is retried.

use thiserror::Error;

/// Errors returned by remote calls.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP request failed (connection, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A response body could not be parsed.
    #[error("malformed {what} response: {source}")]
    Decode {
        /// Which response was being decoded.
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A request payload could not be encoded.
    #[error("failed to encode request payload: {0}")]
    Encode(#[source] serde_json::Error),

    /// The chat service answered with `ok: false`.
    #[error("chat service rejected the request: {description}")]
    Rejected { description: String },
}

impl TransportError {
    /// Creates a `Rejected` error.
    pub fn rejected(description: impl Into<String>) -> Self {
        TransportError::Rejected {
            description: description.into(),
        }
    }
}

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;
