//! Auth-token declarations and the token cache.
//!
//! Some APIs want a short-lived token, issued by a separate endpoint, on
//! every request. An [`Endpoint`] declares this with an [`AuthToken`]; the
//! dispatcher fetches the token first and injects it according to the
//! declared [`TokenPlacement`]. Whether the token survives the call is decided
//! by the dispatcher's [`TokenPolicy`] and stored in a [`TokenCache`].

use std::fmt;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::api_name::ApiName;
use crate::endpoint::Endpoint;

/// Where a fetched token is placed on the primary request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPlacement {
    /// Added to the request params under the token's response name.
    #[default]
    Param,

    /// Sent as `Authorization: Bearer <token>`.
    Bearer,

    /// Sent verbatim in a custom header (e.g. `X-Auth-Token`).
    Header(String),
}

/// Declares that an endpoint needs a token from another endpoint.
///
/// ## Examples
///
/// ```rust
/// use api_consumer::{AuthToken, Endpoint, RestMethod};
///
/// let token_endpoint = Endpoint::builder()
///     .api_name("discourse")
///     .method(RestMethod::Get)
///     .path("/session/token")
///     .build()
///     .unwrap();
///
/// let auth = AuthToken::new(token_endpoint, "auth_token").with_fetch_key_name("key");
/// assert_eq!(auth.response_name(), "auth_token");
/// ```
#[derive(Debug, Clone)]
pub struct AuthToken {
    endpoint: Box<Endpoint>,
    response_name: String,
    fetch_key_name: Option<String>,
    placement: TokenPlacement,
}

impl AuthToken {
    /// Declares a token read from the `response_name` field of
    /// `endpoint`'s response.
    pub fn new(endpoint: Endpoint, response_name: impl Into<String>) -> Self {
        Self {
            endpoint: Box::new(endpoint),
            response_name: response_name.into(),
            fetch_key_name: None,
            placement: TokenPlacement::default(),
        }
    }

    /// Sends the token endpoint's api key as a param under `name`.
    pub fn with_fetch_key_name(mut self, name: impl Into<String>) -> Self {
        self.fetch_key_name = Some(name.into());
        self
    }

    /// Changes where the fetched token is placed.
    pub fn with_placement(mut self, placement: TokenPlacement) -> Self {
        self.placement = placement;
        self
    }

    /// The token-issuing endpoint.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Field name of the token in the token response.
    pub fn response_name(&self) -> &str {
        &self.response_name
    }

    /// Param name under which the token endpoint's api key is sent.
    pub fn fetch_key_name(&self) -> Option<&str> {
        self.fetch_key_name.as_deref()
    }

    /// Returns where the token is placed on the primary request.
    pub fn placement(&self) -> &TokenPlacement {
        &self.placement
    }
}

/// Whether a fetched token outlives the call that fetched it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenPolicy {
    /// Clear the token after injecting it; every send fetches a new one.
    #[default]
    ClearAfterUse,

    /// Keep the token and reuse it for later sends.
    Preserve,
}

/// Identifies the token endpoint a cached token came from.
///
/// A token is only handed back for the issuer that produced it, so a token
/// fetched for one api never travels to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenIssuer {
    api_name: ApiName,
    url: String,
}

impl TokenIssuer {
    pub fn new(api_name: ApiName, url: impl Into<String>) -> Self {
        Self {
            api_name,
            url: url.into(),
        }
    }

    /// Returns the api name of the token endpoint.
    pub fn api_name(&self) -> &ApiName {
        &self.api_name
    }

    /// Returns the resolved URL of the token endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Storage for at most one auth token.
///
/// Implementations hold no TTL and no per-api keys: a token is present
/// until it is cleared or replaced. A lookup for a different issuer than the
/// stored one behaves like an empty slot.
pub trait TokenCache: Send + Sync + fmt::Debug {
    /// Returns the stored token if it was issued by `issuer`.
    fn get(&self, issuer: &TokenIssuer) -> Option<String>;

    /// Stores `token` for `issuer`, replacing any previous one.
    fn set(&self, issuer: TokenIssuer, token: String);

    /// Drops the stored token.
    fn clear(&self);
}

/// In-memory [`TokenCache`] holding a single slot.
#[derive(Debug, Default)]
pub struct SingleSlotTokenCache {
    slot: Mutex<Option<(TokenIssuer, String)>>,
}

impl SingleSlotTokenCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenCache for SingleSlotTokenCache {
    fn get(&self, issuer: &TokenIssuer) -> Option<String> {
        match &*self.slot.lock().unwrap_or_else(PoisonError::into_inner) {
            Some((stored, token)) if stored == issuer => Some(token.clone()),
            _ => None,
        }
    }

    fn set(&self, issuer: TokenIssuer, token: String) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some((issuer, token));
    }

    fn clear(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
