//! Per-api configuration and the providers that resolve it.
//!
//! The dispatcher never reads global configuration. It asks an injected
//! [`CredentialProvider`] for the [`ApiConfig`] of an endpoint's api name and
//! uses what comes back: the base URI, an api key for token endpoints, and
//! basic-auth credentials. Missing values are not errors; they simply turn the
//! corresponding feature off.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api_name::ApiName;
use crate::error::ConfigError;

/// Configuration for one api.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_uri: Option<String>,
    pub api_key: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ApiConfig {
    /// Returns the api key if it is set and non-empty.
    pub fn api_key(&self) -> Option<&str> {
        non_empty(&self.api_key)
    }

    /// Returns the base URI if it is set and non-empty.
    pub fn base_uri(&self) -> Option<&str> {
        non_empty(&self.base_uri)
    }

    /// Returns `(username, password)` only when both are non-empty.
    pub fn basic_auth(&self) -> Option<(&str, &str)> {
        Some((non_empty(&self.username)?, non_empty(&self.password)?))
    }

    /// Returns `true` when both username and password are non-empty.
    pub fn has_basic_auth(&self) -> bool {
        self.basic_auth().is_some()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Resolves [`ApiConfig`] by api name.
pub trait CredentialProvider: Send + Sync + fmt::Debug {
    /// Returns the configuration for `api_name`, or `None` if the api is
    /// unknown to this provider.
    fn lookup(&self, api_name: &ApiName) -> Option<ApiConfig>;
}

/// A fixed map of api configurations.
///
/// Can be deserialized from a document keyed by api name:
///
/// ```rust
/// use api_consumer::{ApiName, CredentialProvider, StaticCredentials};
///
/// let credentials = StaticCredentials::from_yaml_str(
///     "shopify:\n  base_uri: https://shop.example.com\n  username: user\n  password: secret\n",
/// )
/// .unwrap();
///
/// let config = credentials.lookup(&ApiName::new("shopify").unwrap()).unwrap();
/// assert!(config.has_basic_auth());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticCredentials {
    apis: HashMap<ApiName, ApiConfig>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the configuration for an api.
    pub fn insert(mut self, api_name: ApiName, config: ApiConfig) -> Self {
        self.apis.insert(api_name, config);
        self
    }

    /// Parses a JSON object keyed by api name.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed documents or invalid api names.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a YAML mapping keyed by api name.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::Yaml`] for malformed documents or invalid api names.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn len(&self) -> usize {
        self.apis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apis.is_empty()
    }
}

impl CredentialProvider for StaticCredentials {
    fn lookup(&self, api_name: &ApiName) -> Option<ApiConfig> {
        self.apis.get(api_name).cloned()
    }
}

/// Reads api configuration from environment variables.
///
/// For an api named `my-shop` the variables are `MY_SHOP_BASE_URI`,
/// `MY_SHOP_API_KEY`, `MY_SHOP_USERNAME` and `MY_SHOP_PASSWORD`, each
/// optionally preceded by a fixed prefix (e.g. `APP_MY_SHOP_BASE_URI`).
#[derive(Debug, Clone, Default)]
pub struct EnvCredentials {
    prefix: Option<String>,
}

impl EnvCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends `prefix` (plus `_`) to every variable name.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    /// The variable name holding `field` for `api_name`.
    pub fn var_name(&self, api_name: &ApiName, field: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}_{}_{field}", api_name.env_prefix()),
            None => format!("{}_{field}", api_name.env_prefix()),
        }
    }

    fn read(&self, api_name: &ApiName, field: &str) -> Option<String> {
        std::env::var(self.var_name(api_name, field)).ok()
    }
}

impl CredentialProvider for EnvCredentials {
    fn lookup(&self, api_name: &ApiName) -> Option<ApiConfig> {
        let config = ApiConfig {
            base_uri: self.read(api_name, "BASE_URI"),
            api_key: self.read(api_name, "API_KEY"),
            username: self.read(api_name, "USERNAME"),
            password: self.read(api_name, "PASSWORD"),
        };

        if config == ApiConfig::default() {
            tracing::debug!(api.name = %api_name, "No environment configuration found");
            return None;
        }
        Some(config)
    }
}
