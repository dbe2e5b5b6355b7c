//! Layered error types for the dispatcher.
//!
//! The error hierarchy is structured for actionable diagnostics:
//! - [`ApiError`] - Top-level error type for everything that can fail a send
//! - [`ClientError`] - Transport and network errors
//! - [`ValidationError`] - Response body parsing errors
//! - [`AuthError`] - Auth-token flow errors
//! - [`ConfigError`] - Endpoint, credential and definition errors
//!
//! None of these escape [`Dispatcher::send`](crate::Dispatcher::send); they
//! are folded into a [`RequestResult::Failure`](crate::RequestResult).

mod api_error;
mod auth_error;
mod client_error;
mod config_error;
mod validation_error;

pub use api_error::ApiError;
pub use auth_error::AuthError;
pub use client_error::ClientError;
pub use config_error::ConfigError;
pub use validation_error::ValidationError;
