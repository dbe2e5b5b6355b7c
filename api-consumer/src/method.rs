//! HTTP verbs supported by the dispatcher.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumIter, IntoStaticStr};

use crate::error::ConfigError;

/// The HTTP verbs an [`Endpoint`](crate::Endpoint) may declare.
///
/// The set is closed: anything else is rejected when the verb is parsed,
/// so an endpoint holding a `RestMethod` can always be dispatched.
///
/// ## Examples
///
/// ```rust
/// use api_consumer::RestMethod;
///
/// let method: RestMethod = "post".parse().unwrap();
/// assert_eq!(method, RestMethod::Post);
/// assert!(method.sends_body());
///
/// assert!("TRACE".parse::<RestMethod>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum RestMethod {
    /// HTTP GET - params travel in the query string.
    Get,
    /// HTTP POST
    Post,
    /// HTTP PUT
    Put,
    /// HTTP PATCH
    Patch,
    /// HTTP DELETE
    Delete,
}

impl RestMethod {
    /// Returns `true` when params are sent as a request body rather than
    /// as query parameters.
    pub fn sends_body(&self) -> bool {
        !matches!(self, Self::Get)
    }

    /// Returns the uppercase verb name.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Converts to the equivalent `reqwest::Method`.
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl FromStr for RestMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            _ => Err(ConfigError::UnsupportedVerb {
                verb: s.to_string(),
            }),
        }
    }
}

impl From<RestMethod> for reqwest::Method {
    fn from(method: RestMethod) -> Self {
        method.to_reqwest()
    }
}

impl Serialize for RestMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RestMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_display() {
        assert_eq!(RestMethod::Get.to_string(), "GET");
        assert_eq!(RestMethod::Patch.to_string(), "PATCH");
        assert_eq!(RestMethod::Delete.as_str(), "DELETE");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("get".parse::<RestMethod>().unwrap(), RestMethod::Get);
        assert_eq!("Post".parse::<RestMethod>().unwrap(), RestMethod::Post);
        assert_eq!(" PUT ".parse::<RestMethod>().unwrap(), RestMethod::Put);
    }

    #[test]
    fn test_unsupported_verb_names_the_verb() {
        let err = "TRACE".parse::<RestMethod>().unwrap_err();
        assert!(matches!(
            &err,
            ConfigError::UnsupportedVerb { verb } if verb == "TRACE"
        ));
        assert!(err.to_string().contains("TRACE"));
    }

    #[test]
    fn test_sends_body() {
        assert!(!RestMethod::Get.sends_body());
        assert!(RestMethod::Post.sends_body());
        assert!(RestMethod::Put.sends_body());
        assert!(RestMethod::Patch.sends_body());
        assert!(RestMethod::Delete.sends_body());
    }

    #[test]
    fn test_enum_iteration() {
        assert_eq!(RestMethod::iter().count(), 5);
    }

    #[test]
    fn test_serde_roundtrip_rejects_unknown() {
        let method: RestMethod = serde_json::from_str("\"patch\"").unwrap();
        assert_eq!(method, RestMethod::Patch);
        assert_eq!(serde_json::to_string(&method).unwrap(), "\"PATCH\"");
        assert!(serde_json::from_str::<RestMethod>("\"OPTIONS\"").is_err());
    }

    #[test]
    fn test_to_reqwest() {
        assert_eq!(RestMethod::Get.to_reqwest(), reqwest::Method::GET);
        assert_eq!(RestMethod::Delete.to_reqwest(), reqwest::Method::DELETE);
    }
}
