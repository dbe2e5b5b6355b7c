//! Endpoint, credential and definition errors.

use thiserror::Error;

use crate::api_name::ApiNameError;

/// Errors in endpoint or credential configuration.
///
/// These occur before any request is sent and usually indicate a
/// programmer or configuration mistake.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The declared HTTP verb is not one the dispatcher supports.
    #[error("Unsupported HTTP verb: {verb}")]
    UnsupportedVerb {
        /// The verb as it was declared.
        verb: String,
    },

    /// Api name validation failed.
    #[error("Invalid api name: {0}")]
    InvalidApiName(#[from] ApiNameError),

    /// Neither the endpoint nor the credential provider supplied a base URI.
    #[error("No base URI configured for {api_name}")]
    MissingBaseUri {
        /// The api whose base URI is missing.
        api_name: String,
    },

    /// A header name or value cannot be sent.
    #[error("Invalid header {name}: {message}")]
    InvalidHeader {
        /// The header name.
        name: String,
        /// Why it was rejected.
        message: String,
    },

    /// A JSON credential map or endpoint definition could not be read.
    #[error("Invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML credential map or endpoint definition could not be read.
    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    /// Creates an invalid header error.
    pub fn invalid_header(name: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            message: message.to_string(),
        }
    }
}
