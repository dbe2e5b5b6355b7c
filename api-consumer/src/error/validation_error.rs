//! Response body parsing errors.

use thiserror::Error;

/// Errors while turning a response body into a payload map.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The body was valid JSON but neither an object nor an array.
    #[error("Unexpected JSON payload: expected an object or array, got {kind}")]
    UnexpectedPayload {
        /// The JSON kind that was received.
        kind: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_parse_display() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err = ValidationError::JsonParse(json_err);
        assert!(err.to_string().starts_with("JSON parse error"));
    }

    #[test]
    fn test_unexpected_payload_display() {
        let err = ValidationError::UnexpectedPayload { kind: "string" };
        assert!(err.to_string().contains("got string"));
    }
}
