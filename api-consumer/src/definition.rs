//! Serializable endpoint definitions.
//!
//! An [`EndpointDefinition`] is the configuration-file form of an
//! [`Endpoint`]: everything is plain data, including the verb, which is only
//! checked when the definition is converted. That keeps a single bad entry
//! in a catalogue of endpoints from failing the whole document.
//!
//! ```yaml
//! api_name: discourse
//! verb: GET
//! path: /posts/{id}.json
//! url_params:
//!   id: 7
//! auth_token:
//!   response_name: auth_token
//!   fetch_key_name: api_key
//!   endpoint:
//!     api_name: discourse
//!     verb: POST
//!     path: /session/token
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::auth::{AuthToken, TokenPlacement};
use crate::endpoint::Endpoint;
use crate::error::ConfigError;
use crate::hydrate::param_to_string;
use crate::method::RestMethod;

/// Plain-data description of an [`Endpoint`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointDefinition {
    pub api_name: String,
    /// HTTP verb, validated on conversion.
    pub verb: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Header values are sent as text; non-string values use their
    /// display form.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub headers: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub url_params: Map<String, Value>,
    #[serde(default)]
    pub concatenate_params: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<AuthTokenDefinition>,
}

/// Plain-data description of an [`AuthToken`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthTokenDefinition {
    pub endpoint: Box<EndpointDefinition>,
    pub response_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_key_name: Option<String>,
    #[serde(default)]
    pub placement: TokenPlacement,
}

impl EndpointDefinition {
    /// Parses a definition from JSON.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::Json`] if the document is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a definition from YAML.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the document is malformed.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Converts into an [`Endpoint`].
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::UnsupportedVerb`] for an unknown verb (here or
    /// in the token endpoint) and [`ConfigError::InvalidApiName`] for an
    /// invalid api name.
    pub fn to_endpoint(&self) -> Result<Endpoint, ConfigError> {
        Endpoint::try_from(self)
    }
}

impl TryFrom<&EndpointDefinition> for Endpoint {
    type Error = ConfigError;

    fn try_from(def: &EndpointDefinition) -> Result<Self, Self::Error> {
        let method: RestMethod = def.verb.parse()?;

        let mut builder = Endpoint::builder()
            .api_name(def.api_name.as_str())
            .method(method)
            .path(def.path.as_str())
            .concatenate_params(def.concatenate_params);

        if let Some(base_uri) = &def.base_uri {
            builder = builder.base_uri(base_uri.as_str());
        }
        if let Some(name) = &def.name {
            builder = builder.name(name.as_str());
        }
        if let Some(description) = &def.description {
            builder = builder.description(description.as_str());
        }
        if let Some(auth) = &def.auth_token {
            builder = builder.auth_token(AuthToken::try_from(auth)?);
        }

        Ok(builder
            .build()?
            .set_headers(def.headers.iter().map(|(k, v)| (k.as_str(), param_to_string(v))))
            .set_params(def.params.iter().map(|(k, v)| (k.as_str(), v.clone())))
            .set_url_params(
                def.url_params
                    .iter()
                    .map(|(k, v)| (k.as_str(), param_to_string(v))),
            ))
    }
}

impl TryFrom<&AuthTokenDefinition> for AuthToken {
    type Error = ConfigError;

    fn try_from(def: &AuthTokenDefinition) -> Result<Self, Self::Error> {
        let endpoint = Endpoint::try_from(def.endpoint.as_ref())?;
        let mut auth =
            AuthToken::new(endpoint, def.response_name.as_str()).with_placement(def.placement.clone());
        if let Some(key_name) = &def.fetch_key_name {
            auth = auth.with_fetch_key_name(key_name.as_str());
        }
        Ok(auth)
    }
}
