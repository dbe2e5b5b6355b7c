//! Endpoint descriptor with type-state builder pattern.
//!
//! An [`Endpoint`] describes one remote call: which api it belongs to (the
//! key used for credential lookup), the verb, the path template, and the
//! headers and params to send. The [`EndpointBuilder`] uses a type-state
//! pattern so the api name, verb and path must be set before `build()`
//! is available.
//!
//! After construction an endpoint is adjusted with consuming mutators
//! (`add_header`, `add_param`, ...) that return the updated value.

use std::borrow::Cow;
use std::marker::PhantomData;

use serde_json::{Map, Value};

use crate::api_name::ApiName;
use crate::auth::AuthToken;
use crate::error::ConfigError;
use crate::hydrate::{encode_query, hydrate_url_params, path_params};
use crate::method::RestMethod;

/// Marker traits for builder state tracking.
pub mod builder_state {
    /// Marker for a field that has not been set.
    pub struct Missing;
    /// Marker for a field that has been set.
    pub struct Present;
}

use builder_state::{Missing, Present};

/// A descriptor of one remote API operation.
///
/// ## Examples
///
/// ```rust
/// use api_consumer::{Endpoint, RestMethod};
///
/// let endpoint = Endpoint::builder()
///     .api_name("shop")
///     .base_uri("https://api.example.com")
///     .method(RestMethod::Get)
///     .path("/users/{id}")
///     .build()
///     .unwrap()
///     .add_url_param("id", "42");
///
/// assert_eq!(endpoint.uri(), "https://api.example.com/users/42");
/// ```
#[derive(Debug, Clone)]
pub struct Endpoint {
    api_name: ApiName,
    /// Overrides the base URI from the credential provider when set.
    base_uri: Option<String>,
    method: RestMethod,
    /// URL path template (may contain `{param}` placeholders).
    path: String,
    name: Option<String>,
    description: Option<String>,
    headers: Vec<(String, String)>,
    params: Map<String, Value>,
    url_params: Vec<(String, String)>,
    /// Send params as a literal query string instead of a structured map.
    concatenate_params: bool,
    auth_token: Option<AuthToken>,
}

impl Endpoint {
    /// Creates a new endpoint builder.
    pub fn builder() -> EndpointBuilder<Missing, Missing, Missing> {
        EndpointBuilder::new()
    }

    /// Returns the api name used for credential lookup.
    pub fn api_name(&self) -> &ApiName {
        &self.api_name
    }

    /// Returns the base URI override, if one was set.
    pub fn base_uri(&self) -> Option<&str> {
        self.base_uri.as_deref()
    }

    /// Returns the HTTP verb.
    pub fn method(&self) -> RestMethod {
        self.method
    }

    /// Returns the path template, before hydration.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the optional request name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the optional description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the headers in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Looks up a header by exact name.
    pub fn header(&self, name: &str) -> Option<&str> {
        lookup(&self.headers, name)
    }

    /// Returns the url params used for path hydration.
    pub fn url_params(&self) -> &[(String, String)] {
        &self.url_params
    }

    /// Returns all params, regardless of how they will be sent.
    pub fn raw_params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Returns a single param.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Returns the params to send as a structured map.
    ///
    /// When params are concatenated this is always empty: they travel in
    /// [`query_string`](Self::query_string) instead, so nothing is encoded
    /// twice.
    pub fn params(&self) -> Cow<'_, Map<String, Value>> {
        if self.concatenate_params {
            Cow::Owned(Map::new())
        } else {
            Cow::Borrowed(&self.params)
        }
    }

    /// Returns `?` followed by the percent-encoded params when params are
    /// concatenated, `None` otherwise.
    pub fn query_string(&self) -> Option<String> {
        self.concatenate_params
            .then(|| format!("?{}", encode_query(&self.params)))
    }

    /// Returns `true` when params are sent as a literal query string.
    pub fn concatenates_params(&self) -> bool {
        self.concatenate_params
    }

    /// Returns the path with url params substituted.
    pub fn resolved_path(&self) -> String {
        hydrate_url_params(&self.path, &self.url_params)
    }

    /// Returns the base URI joined with the hydrated path.
    ///
    /// Without a base URI override this is just the hydrated path; the
    /// dispatcher fills in the configured base before sending.
    pub fn uri(&self) -> String {
        format!(
            "{}{}",
            self.base_uri.as_deref().unwrap_or_default(),
            self.resolved_path()
        )
    }

    /// Extracts placeholder names from the path template.
    ///
    /// Returns parameter names in the order they appear in the path.
    pub fn path_params(&self) -> Vec<&str> {
        path_params(&self.path)
    }

    /// Returns `true` when a token must be fetched before sending.
    pub fn uses_auth_token(&self) -> bool {
        self.auth_token.is_some()
    }

    /// Returns the auth-token declaration, if any.
    pub fn auth_token(&self) -> Option<&AuthToken> {
        self.auth_token.as_ref()
    }

    /// Sets (or replaces) a header.
    pub fn add_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        upsert(&mut self.headers, name.into(), value.into());
        self
    }

    /// Replaces all headers.
    pub fn set_headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.clear();
        for (name, value) in headers {
            upsert(&mut self.headers, name.into(), value.into());
        }
        self
    }

    /// Sets (or replaces) a param.
    pub fn add_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Merges params into the existing ones; later values win.
    pub fn set_params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        for (name, value) in params {
            self.params.insert(name.into(), value.into());
        }
        self
    }

    /// Sets (or replaces) a url param used for path hydration.
    pub fn add_url_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        upsert(&mut self.url_params, name.into(), value.into());
        self
    }

    /// Merges url params into the existing ones; later values win.
    pub fn set_url_params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in params {
            upsert(&mut self.url_params, name.into(), value.into());
        }
        self
    }

    /// Adds a fetched auth token as a param.
    ///
    /// Nothing is added when either the name or the token is empty.
    pub fn add_auth_token(self, param_name: &str, token: &str) -> Self {
        if param_name.is_empty() || token.is_empty() {
            return self;
        }
        self.add_param(param_name, token)
    }

    /// Sets the base URI override.
    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = Some(base_uri.into());
        self
    }
}

/// Sets `key` in an ordered pair list, keeping the position of an existing key.
fn upsert(pairs: &mut Vec<(String, String)>, key: String, value: String) {
    match pairs.iter_mut().find(|(k, _)| *k == key) {
        Some(pair) => pair.1 = value,
        None => pairs.push((key, value)),
    }
}

fn lookup<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Type-state builder for [`Endpoint`].
///
/// ## Type Parameters
///
/// - `Name`: State of the api name field (`Missing` or `Present`).
/// - `Method`: State of the method field (`Missing` or `Present`).
/// - `Path`: State of the path field (`Missing` or `Present`).
pub struct EndpointBuilder<Name, Method, Path> {
    api_name: Option<String>,
    method: Option<RestMethod>,
    path: Option<String>,
    base_uri: Option<String>,
    name: Option<String>,
    description: Option<String>,
    concatenate_params: bool,
    auth_token: Option<AuthToken>,
    _phantom: PhantomData<(Name, Method, Path)>,
}

impl EndpointBuilder<Missing, Missing, Missing> {
    /// Creates a new endpoint builder with no fields set.
    pub fn new() -> Self {
        Self {
            api_name: None,
            method: None,
            path: None,
            base_uri: None,
            name: None,
            description: None,
            concatenate_params: false,
            auth_token: None,
            _phantom: PhantomData,
        }
    }
}

impl Default for EndpointBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

// Api name setter - transitions Name from Missing to Present
impl<M, P> EndpointBuilder<Missing, M, P> {
    /// Sets the api name, the key used to look up credentials.
    ///
    /// Validated when the endpoint is built.
    pub fn api_name(self, api_name: impl Into<String>) -> EndpointBuilder<Present, M, P> {
        EndpointBuilder {
            api_name: Some(api_name.into()),
            method: self.method,
            path: self.path,
            base_uri: self.base_uri,
            name: self.name,
            description: self.description,
            concatenate_params: self.concatenate_params,
            auth_token: self.auth_token,
            _phantom: PhantomData,
        }
    }
}

// Method setter - transitions Method from Missing to Present
impl<N, P> EndpointBuilder<N, Missing, P> {
    /// Sets the HTTP verb.
    pub fn method(self, method: RestMethod) -> EndpointBuilder<N, Present, P> {
        EndpointBuilder {
            api_name: self.api_name,
            method: Some(method),
            path: self.path,
            base_uri: self.base_uri,
            name: self.name,
            description: self.description,
            concatenate_params: self.concatenate_params,
            auth_token: self.auth_token,
            _phantom: PhantomData,
        }
    }
}

// Path setter - transitions Path from Missing to Present
impl<N, M> EndpointBuilder<N, M, Missing> {
    /// Sets the URL path template.
    ///
    /// The path may contain parameter placeholders like `{id}` or `{name}`.
    pub fn path(self, path: impl Into<String>) -> EndpointBuilder<N, M, Present> {
        EndpointBuilder {
            api_name: self.api_name,
            method: self.method,
            path: Some(path.into()),
            base_uri: self.base_uri,
            name: self.name,
            description: self.description,
            concatenate_params: self.concatenate_params,
            auth_token: self.auth_token,
            _phantom: PhantomData,
        }
    }
}

// Optional setters - available in any state
impl<N, M, P> EndpointBuilder<N, M, P> {
    /// Sets a base URI that takes precedence over the configured one.
    pub fn base_uri(self, base_uri: impl Into<String>) -> Self {
        EndpointBuilder {
            base_uri: Some(base_uri.into()),
            ..self
        }
    }

    /// Sets an optional request name.
    pub fn name(self, name: impl Into<String>) -> Self {
        EndpointBuilder {
            name: Some(name.into()),
            ..self
        }
    }

    /// Sets an optional description for this endpoint.
    pub fn description(self, description: impl Into<String>) -> Self {
        EndpointBuilder {
            description: Some(description.into()),
            ..self
        }
    }

    /// Sends params as a literal query string.
    ///
    /// For APIs that reject structured or array-style param encoding.
    pub fn concatenate_params(self, concatenate: bool) -> Self {
        EndpointBuilder {
            concatenate_params: concatenate,
            ..self
        }
    }

    /// Requires a token from another endpoint before this one is sent.
    pub fn auth_token(self, auth_token: AuthToken) -> Self {
        EndpointBuilder {
            auth_token: Some(auth_token),
            ..self
        }
    }
}

// Build method - only available when all required fields are Present
impl EndpointBuilder<Present, Present, Present> {
    /// Builds the endpoint.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidApiName`] if the api name is not a
    /// valid [`ApiName`].
    pub fn build(self) -> Result<Endpoint, ConfigError> {
        let api_name = self.api_name.expect("api name set via type state");

        Ok(Endpoint {
            api_name: ApiName::new(api_name)?,
            base_uri: self.base_uri,
            method: self.method.expect("method set via type state"),
            path: self.path.expect("path set via type state"),
            name: self.name,
            description: self.description,
            headers: Vec::new(),
            params: Map::new(),
            url_params: Vec::new(),
            concatenate_params: self.concatenate_params,
            auth_token: self.auth_token,
        })
    }
}
