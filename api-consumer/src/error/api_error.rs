//! Top-level API error type.

use super::{AuthError, ClientError, ConfigError, ValidationError};
use thiserror::Error;

/// Top-level error type for everything that can fail a dispatch.
///
/// This enum aggregates all error categories, enabling unified error handling
/// while preserving the ability to match on specific error types when needed.
///
/// ## Examples
///
/// ```rust,ignore
/// use api_consumer::error::ApiError;
///
/// fn describe(err: &ApiError) -> &'static str {
///     match err {
///         ApiError::Client(_) => "network",
///         ApiError::Validation(_) => "invalid response body",
///         ApiError::Auth(_) => "auth token flow",
///         ApiError::Config(_) => "configuration",
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport errors (network, timeout, connection failures).
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Response body errors (parse failures, unexpected payloads).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Auth-token flow errors.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Endpoint and credential configuration errors.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ApiError {
    /// Numeric code reported alongside the message in an error payload.
    ///
    /// Only transport errors that carry an HTTP status have one.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Client(e) => e.status_code().map(i64::from),
            _ => None,
        }
    }
}
