//! Auth-token flow errors.

use thiserror::Error;

/// Errors raised while resolving or applying an auth token.
///
/// A failure of the token request itself is reported as the underlying
/// transport or validation error, not as an `AuthError`.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The configured token header name is not a valid HTTP header name.
    #[error("Invalid auth token header name: {header}")]
    InvalidTokenHeader {
        /// The rejected header name.
        header: String,
    },

    /// The fetched token cannot be used as a header value.
    #[error("Auth token is not a valid header value")]
    InvalidTokenValue,

    /// A token endpoint declared token auth of its own.
    #[error("Token endpoint for {api_name} must not itself require an auth token")]
    NestedTokenEndpoint {
        /// The api name of the offending token endpoint.
        api_name: String,
    },
}
