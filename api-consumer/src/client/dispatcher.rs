//! Request dispatch with tracing instrumentation.
//!
//! This module provides the [`Dispatcher`], which prepares requests from
//! [`Endpoint`] descriptors, runs the auth-token sub-flow when an endpoint
//! asks for it, and normalizes whatever comes back.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn, Span};
use url::Url;

use super::transport::{PreparedRequest, ReqwestTransport, Transport, DEFAULT_TIMEOUT_SECS};
use crate::auth::{
    AuthToken, SingleSlotTokenCache, TokenCache, TokenIssuer, TokenPlacement, TokenPolicy,
};
use crate::credentials::{ApiConfig, CredentialProvider};
use crate::definition::EndpointDefinition;
use crate::endpoint::Endpoint;
use crate::error::{ApiError, AuthError, ConfigError};
use crate::response::{
    LogSink, ParsePolicy, RawResponse, RequestResult, ResponseHandler, TracingLogSink,
};

/// Builder for configuring a [`Dispatcher`].
#[derive(Debug)]
pub struct DispatcherBuilder {
    credentials: Arc<dyn CredentialProvider>,
    timeout: Duration,
    default_headers: HeaderMap,
    token_cache: Arc<dyn TokenCache>,
    token_policy: TokenPolicy,
    parse_policy: ParsePolicy,
    log_sink: Arc<dyn LogSink>,
}

impl DispatcherBuilder {
    fn new(credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            credentials,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_headers: HeaderMap::new(),
            token_cache: Arc::new(SingleSlotTokenCache::new()),
            token_policy: TokenPolicy::default(),
            parse_policy: ParsePolicy::default(),
            log_sink: Arc::new(TracingLogSink),
        }
    }

    /// Sets the request timeout of the reqwest transport.
    ///
    /// ## Examples
    ///
    /// ```rust,ignore
    /// use std::time::Duration;
    ///
    /// let dispatcher = Dispatcher::builder(credentials)
    ///     .timeout(Duration::from_secs(60))
    ///     .build()?;
    /// ```
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a header sent with every request of the reqwest transport.
    ///
    /// ## Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, ApiError> {
        let (name, value) = header_pair(name.as_ref(), value.as_ref())?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Replaces the token cache.
    pub fn token_cache(mut self, cache: Arc<dyn TokenCache>) -> Self {
        self.token_cache = cache;
        self
    }

    /// Sets whether fetched tokens are kept between sends.
    pub fn token_policy(mut self, policy: TokenPolicy) -> Self {
        self.token_policy = policy;
        self
    }

    /// Keeps fetched auth tokens for later sends instead of clearing them.
    pub fn preserve_auth_token(self) -> Self {
        self.token_policy(TokenPolicy::Preserve)
    }

    /// Sets how unparseable response bodies affect the result.
    pub fn parse_policy(mut self, policy: ParsePolicy) -> Self {
        self.parse_policy = policy;
        self
    }

    /// Replaces the sink that receives non-fatal diagnostics.
    pub fn log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = sink;
        self
    }

    /// Builds a [`Dispatcher`] on the reqwest transport.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<Dispatcher, ApiError> {
        let transport = ReqwestTransport::new(self.timeout, self.default_headers.clone())?;
        Ok(self.build_with(transport))
    }

    /// Builds a [`Dispatcher`] on a custom transport.
    ///
    /// The timeout and default headers only apply to the reqwest transport
    /// and are ignored here.
    pub fn build_with<T: Transport>(self, transport: T) -> Dispatcher<T> {
        Dispatcher {
            transport,
            credentials: self.credentials,
            token_cache: self.token_cache,
            token_policy: self.token_policy,
            parse_policy: self.parse_policy,
            log_sink: self.log_sink,
            token_lock: Mutex::new(()),
        }
    }
}

/// Turns [`Endpoint`]s into requests and normalized results.
///
/// `send` never returns an error: configuration problems, transport
/// failures and (under [`ParsePolicy::Strict`]) unparseable bodies all come
/// back as [`RequestResult::Failure`].
///
/// ## Examples
///
/// ```rust,ignore
/// use api_consumer::{Dispatcher, StaticCredentials};
///
/// let dispatcher = Dispatcher::builder(StaticCredentials::from_json_str(config)?)
///     .preserve_auth_token()
///     .build()?;
///
/// let result = dispatcher.send(&endpoint).await;
/// let response = result.into_response();
/// ```
#[derive(Debug)]
pub struct Dispatcher<T: Transport = ReqwestTransport> {
    transport: T,
    credentials: Arc<dyn CredentialProvider>,
    token_cache: Arc<dyn TokenCache>,
    token_policy: TokenPolicy,
    parse_policy: ParsePolicy,
    log_sink: Arc<dyn LogSink>,
    /// Held across the read-check-fetch-write of the auth-token flow.
    token_lock: Mutex<()>,
}

impl Dispatcher {
    /// Creates a new builder for configuring a dispatcher.
    pub fn builder(credentials: impl CredentialProvider + 'static) -> DispatcherBuilder {
        DispatcherBuilder::new(Arc::new(credentials))
    }

    /// Creates a dispatcher with default settings.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(credentials: impl CredentialProvider + 'static) -> Result<Self, ApiError> {
        Self::builder(credentials).build()
    }
}

impl<T: Transport> Dispatcher<T> {
    /// Returns the transport requests are sent through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns whether fetched tokens are kept between sends.
    pub fn token_policy(&self) -> TokenPolicy {
        self.token_policy
    }

    /// Drops any cached auth token.
    pub fn clear_auth_token(&self) {
        self.token_cache.clear();
    }

    /// Sends the endpoint and returns the normalized result.
    pub async fn send(&self, endpoint: &Endpoint) -> RequestResult {
        self.dispatch(endpoint).await.into_result()
    }

    /// Converts a definition and sends it.
    ///
    /// A definition that does not convert (for example one declaring an
    /// unsupported verb) yields a failure without any request being made.
    pub async fn send_definition(&self, definition: &EndpointDefinition) -> RequestResult {
        match Endpoint::try_from(definition) {
            Ok(endpoint) => self.send(&endpoint).await,
            Err(err) => {
                warn!(api.name = %definition.api_name, error = %err, "Endpoint definition rejected");
                ApiError::from(err).into()
            }
        }
    }

    /// Sends the endpoint and returns the response handler, which exposes
    /// the raw body and status alongside the result.
    #[instrument(
        name = "api_request",
        skip(self, endpoint),
        fields(
            api.name = %endpoint.api_name(),
            http.method = tracing::field::Empty,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
            otel.status_code = tracing::field::Empty,
        )
    )]
    pub async fn dispatch(&self, endpoint: &Endpoint) -> ResponseHandler {
        Span::current().record("http.method", endpoint.method().as_str());

        let mut handler = self.response_handler();
        match self.execute(endpoint).await {
            Ok(raw) => {
                Span::current().record("http.status_code", raw.status);
                let otel_status = if raw.is_server_error() { "ERROR" } else { "OK" };
                Span::current().record("otel.status_code", otel_status);
                handler.handle(Some(raw));
            }
            Err(err) => {
                let timed_out = matches!(&err, ApiError::Client(e) if e.is_timeout());
                warn!(error = %err, timed_out, "Request failed");
                Span::current().record("otel.status_code", "ERROR");
                handler.set_exception(err);
                handler.handle(None);
            }
        }
        handler
    }

    /// Resolves everything needed to send the endpoint, including fetching
    /// an auth token when one is declared, without sending it.
    ///
    /// ## Errors
    ///
    /// Returns an error if the base URI is missing, the URL or a header is
    /// invalid, or the auth-token request fails.
    pub async fn prepare(&self, endpoint: &Endpoint) -> Result<PreparedRequest, ApiError> {
        let mut endpoint = endpoint.clone();
        let mut token_header = None;

        if let Some(auth) = endpoint.auth_token().cloned() {
            if let Some(token) = self.resolve_auth_token(&auth).await? {
                match auth.placement() {
                    TokenPlacement::Param => {
                        endpoint = endpoint.add_auth_token(auth.response_name(), &token);
                    }
                    TokenPlacement::Bearer => {
                        let value = token_value(&format!("Bearer {token}"))?;
                        token_header = Some((AUTHORIZATION, value));
                    }
                    TokenPlacement::Header(name) => {
                        let name = HeaderName::try_from(name.as_str()).map_err(|_| {
                            AuthError::InvalidTokenHeader {
                                header: name.clone(),
                            }
                        })?;
                        token_header = Some((name, token_value(&token)?));
                    }
                }
            }
        }

        let config = self.lookup(&endpoint);
        let mut request = build_request(endpoint, &config)?;
        if let Some((name, value)) = token_header {
            request.headers.insert(name, value);
        }
        Ok(request)
    }

    async fn execute(&self, endpoint: &Endpoint) -> Result<RawResponse, ApiError> {
        let request = self.prepare(endpoint).await?;
        Span::current().record("http.url", request.url.as_str());

        Ok(self.transport.send(&request).await?)
    }

    /// Returns the token to inject, fetching it unless the cache holds one
    /// from the same token endpoint.
    async fn resolve_auth_token(&self, auth: &AuthToken) -> Result<Option<String>, ApiError> {
        let request = self.token_request(auth)?;
        let issuer = TokenIssuer::new(auth.endpoint().api_name().clone(), request.url.as_str());

        let _guard = self.token_lock.lock().await;

        let token = match self.token_cache.get(&issuer) {
            Some(token) => {
                debug!(url = %issuer.url(), "Reusing cached auth token");
                Some(token)
            }
            None => {
                let fetched = self.fetch_auth_token(auth, &request).await?;
                match &fetched {
                    Some(token) => self.token_cache.set(issuer, token.clone()),
                    None => warn!(
                        field = auth.response_name(),
                        "Auth token response did not contain the token field"
                    ),
                }
                fetched
            }
        };

        if self.token_policy == TokenPolicy::ClearAfterUse {
            self.token_cache.clear();
        }
        Ok(token)
    }

    /// Prepares the token endpoint, adding the api key under the fetch key
    /// name when both are present.
    fn token_request(&self, auth: &AuthToken) -> Result<PreparedRequest, ApiError> {
        let token_endpoint = auth.endpoint();
        if token_endpoint.uses_auth_token() {
            return Err(AuthError::NestedTokenEndpoint {
                api_name: token_endpoint.api_name().to_string(),
            }
            .into());
        }

        let config = self.lookup(token_endpoint);
        let mut token_endpoint = token_endpoint.clone();
        if let (Some(key_name), Some(api_key)) = (auth.fetch_key_name(), config.api_key()) {
            token_endpoint = token_endpoint.add_param(key_name, api_key);
        }

        build_request(token_endpoint, &config)
    }

    async fn fetch_auth_token(
        &self,
        auth: &AuthToken,
        request: &PreparedRequest,
    ) -> Result<Option<String>, ApiError> {
        debug!(url = %request.url, "Fetching auth token");
        let raw = self.transport.send(request).await?;

        let mut handler = self.response_handler();
        handler.handle(Some(raw));
        if let Some(err) = handler.take_exception() {
            return Err(err);
        }

        Ok(handler
            .response_key_value(auth.response_name())
            .filter(|token| !token.is_empty()))
    }

    fn lookup(&self, endpoint: &Endpoint) -> ApiConfig {
        self.credentials
            .lookup(endpoint.api_name())
            .unwrap_or_default()
    }

    fn response_handler(&self) -> ResponseHandler {
        ResponseHandler::new(self.parse_policy, Arc::clone(&self.log_sink))
    }
}

/// Resolves an endpoint against its api configuration.
fn build_request(endpoint: Endpoint, config: &ApiConfig) -> Result<PreparedRequest, ApiError> {
    let endpoint = if endpoint.base_uri().is_some() {
        endpoint
    } else {
        match config.base_uri() {
            Some(base_uri) => endpoint.with_base_uri(base_uri),
            None => {
                return Err(ConfigError::MissingBaseUri {
                    api_name: endpoint.api_name().to_string(),
                }
                .into())
            }
        }
    };

    let mut uri = endpoint.uri();
    if let Some(query) = endpoint.query_string() {
        if !endpoint.raw_params().is_empty() {
            uri.push_str(&query);
        }
    }
    let url = Url::parse(&uri).map_err(ConfigError::from)?;

    let mut headers = HeaderMap::new();
    for (name, value) in endpoint.headers() {
        let (name, value) = header_pair(name, value)?;
        headers.insert(name, value);
    }

    Ok(PreparedRequest {
        method: endpoint.method(),
        url,
        headers,
        params: endpoint.params().into_owned(),
        basic_auth: config
            .basic_auth()
            .map(|(username, password)| (username.to_string(), password.to_string())),
    })
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), ConfigError> {
    let header_name =
        HeaderName::try_from(name).map_err(|e| ConfigError::invalid_header(name, e))?;
    let header_value =
        HeaderValue::try_from(value).map_err(|e| ConfigError::invalid_header(name, e))?;
    Ok((header_name, header_value))
}

fn token_value(value: &str) -> Result<HeaderValue, AuthError> {
    HeaderValue::try_from(value).map_err(|_| AuthError::InvalidTokenValue)
}
