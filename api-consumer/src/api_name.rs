//! The name an endpoint uses to find its credentials.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key under which an api's configuration is looked up.
///
/// Starts with a letter; the rest may be letters, digits, `_` or `-`.
/// Deserialization runs the same validation as [`ApiName::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiName(String);

/// Why a string was rejected as an [`ApiName`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiNameError {
    #[error("api name cannot be empty")]
    Empty,

    #[error("api name must start with a letter")]
    InvalidStartCharacter,

    #[error("api name contains invalid character '{0}'")]
    InvalidCharacter(char),
}

impl ApiName {
    /// Validates `name` and wraps it.
    ///
    /// ## Errors
    ///
    /// Returns an [`ApiNameError`] describing the first rule `name` breaks.
    pub fn new(name: impl Into<String>) -> Result<Self, ApiNameError> {
        let name = name.into();
        let mut chars = name.chars();

        match chars.next() {
            None => return Err(ApiNameError::Empty),
            Some(first) if !first.is_alphabetic() => {
                return Err(ApiNameError::InvalidStartCharacter)
            }
            Some(_) => {}
        }
        if let Some(bad) = chars.find(|c| !(c.is_alphanumeric() || *c == '_' || *c == '-')) {
            return Err(ApiNameError::InvalidCharacter(bad));
        }

        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The environment variable prefix for this api: uppercased, with
    /// `-` replaced by `_` (`my-shop` becomes `MY_SHOP`).
    pub fn env_prefix(&self) -> String {
        self.0.to_uppercase().replace('-', "_")
    }
}

impl fmt::Display for ApiName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ApiName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ApiName> for String {
    fn from(name: ApiName) -> Self {
        name.0
    }
}

impl TryFrom<String> for ApiName {
    type Error = ApiNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ApiName {
    type Error = ApiNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
