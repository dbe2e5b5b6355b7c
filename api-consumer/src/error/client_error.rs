//! HTTP transport and network errors.

use thiserror::Error;

/// Errors from the transport layer.
///
/// A non-2xx status is not one of these: it is a normal response that the
/// response handler classifies.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed due to network or protocol error.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Request exceeded the configured timeout.
    #[error("Request timeout after {duration_ms}ms")]
    Timeout {
        /// The timeout duration in milliseconds.
        duration_ms: u64,
    },

    /// Failed to establish connection to the server.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Failure reported by a custom transport, displayed verbatim.
    #[error("{0}")]
    Transport(String),
}

impl ClientError {
    /// Returns `true` if the transport gave up waiting.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Request(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Returns the HTTP status code carried by the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
