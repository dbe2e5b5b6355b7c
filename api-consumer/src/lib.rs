//! Configuration-driven HTTP request builder and dispatcher.
//!
//! Describe a remote call once as an [`Endpoint`] (in code or as an
//! [`EndpointDefinition`] loaded from JSON or YAML), then hand it to a
//! [`Dispatcher`] that resolves credentials, fetches auth tokens, sends the
//! request and normalizes whatever comes back into a [`RequestResult`].
//!
//! ## Features
//!
//! - **Endpoint descriptors**: type-state builder, `{placeholder}` path
//!   hydration, structured or concatenated params
//! - **Pluggable credentials**: [`StaticCredentials`] from a config document,
//!   [`EnvCredentials`] from environment variables
//! - **Auth-token sub-flow**: fetch a token from another endpoint and inject
//!   it as a param, bearer header or custom header
//! - **Uniform results**: sends never return `Err`; failures become an
//!   [`ErrorPayload`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use api_consumer::{Dispatcher, Endpoint, RestMethod, StaticCredentials};
//!
//! let credentials = StaticCredentials::from_yaml_str(
//!     "shop:\n  base_uri: https://api.example.com\n",
//! )?;
//! let dispatcher = Dispatcher::new(credentials)?;
//!
//! let endpoint = Endpoint::builder()
//!     .api_name("shop")
//!     .method(RestMethod::Get)
//!     .path("/users/{id}")
//!     .build()?
//!     .add_url_param("id", "42");
//!
//! let response = dispatcher.send(&endpoint).await.into_response();
//! ```

pub mod api_name;
pub mod auth;
pub mod client;
pub mod credentials;
pub mod definition;
pub mod endpoint;
pub mod error;
pub mod hydrate;
pub mod method;
pub mod response;

// Re-exports for convenience
pub use api_name::{ApiName, ApiNameError};
pub use auth::{
    AuthToken, SingleSlotTokenCache, TokenCache, TokenIssuer, TokenPlacement, TokenPolicy,
};
pub use client::{Dispatcher, DispatcherBuilder, PreparedRequest, ReqwestTransport, Transport};
pub use credentials::{ApiConfig, CredentialProvider, EnvCredentials, StaticCredentials};
pub use definition::{AuthTokenDefinition, EndpointDefinition};
pub use endpoint::{Endpoint, EndpointBuilder};
pub use error::{ApiError, AuthError, ClientError, ConfigError, ValidationError};
pub use method::RestMethod;
pub use response::{
    ErrorPayload, LogSink, ParsePolicy, RawResponse, RequestResult, ResponseHandler,
    TracingLogSink,
};
