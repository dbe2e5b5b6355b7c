//! The response normalizer.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::log::{LogSink, TracingLogSink};
use super::result::{ErrorPayload, RequestResult};
use crate::error::{ApiError, ValidationError};

/// Context label reported to the [`LogSink`] for unparseable bodies.
pub const PARSE_CONTEXT: &str = "ResponseHandler::parse_json_response";

/// What the transport hands back: a status and the body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 4xx statuses.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Returns `true` for 5xx statuses.
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

/// How a present but unparseable body affects the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParsePolicy {
    /// The result fails with the parse error.
    #[default]
    Strict,
    /// The result stays successful with an empty payload.
    Lenient,
}

/// Normalizes one response, or the error that replaced it.
///
/// Only a recorded exception marks the result as failed. An HTTP error
/// status with a JSON body is a successful result carrying that body; under
/// [`ParsePolicy::Strict`] an unparseable body counts as an exception.
///
/// ## Examples
///
/// ```rust
/// use api_consumer::response::{RawResponse, ResponseHandler};
///
/// let mut handler = ResponseHandler::default();
/// handler.handle(Some(RawResponse::new(200, r#"{"a":1}"#)));
///
/// assert!(handler.success());
/// assert_eq!(handler.response_array()["a"], 1);
/// ```
#[derive(Debug)]
pub struct ResponseHandler {
    policy: ParsePolicy,
    log_sink: Arc<dyn LogSink>,
    raw: Option<RawResponse>,
    payload: Map<String, Value>,
    exception: Option<ApiError>,
}

impl Default for ResponseHandler {
    fn default() -> Self {
        Self::new(ParsePolicy::default(), Arc::new(TracingLogSink))
    }
}

impl ResponseHandler {
    pub fn new(policy: ParsePolicy, log_sink: Arc<dyn LogSink>) -> Self {
        Self {
            policy,
            log_sink,
            raw: None,
            payload: Map::new(),
            exception: None,
        }
    }

    /// Consumes the raw response, if there is one, and parses its body.
    pub fn handle(&mut self, response: Option<RawResponse>) {
        self.raw = response;
        self.payload = Map::new();

        let parsed = match &self.raw {
            Some(raw) if !raw.body.is_empty() => (raw.status, parse_payload(&raw.body)),
            _ => return,
        };

        match parsed {
            (_, Ok(payload)) => self.payload = payload,
            (status, Err(err)) => {
                self.log_sink.log(
                    PARSE_CONTEXT,
                    &err.to_string(),
                    Some(&json!({ "status": status })),
                );
                if self.policy == ParsePolicy::Strict {
                    self.set_exception(err.into());
                }
            }
        }
    }

    /// Records the error that failed this dispatch.
    pub fn set_exception(&mut self, err: ApiError) {
        self.exception = Some(err);
    }

    /// `true` unless an exception was recorded.
    pub fn success(&self) -> bool {
        self.exception.is_none()
    }

    /// The recorded exception, if any.
    pub fn exception(&self) -> Option<&ApiError> {
        self.exception.as_ref()
    }

    /// Takes the recorded exception, leaving the handler successful.
    pub fn take_exception(&mut self) -> Option<ApiError> {
        self.exception.take()
    }

    /// Error code and message derived from the recorded exception.
    pub fn error_message(&self) -> Option<ErrorPayload> {
        self.exception.as_ref().map(ErrorPayload::from)
    }

    /// The parsed payload; empty when there was no body or it didn't parse.
    pub fn response_array(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// The raw body text, if a response arrived.
    pub fn raw_response(&self) -> Option<&str> {
        self.raw.as_ref().map(|raw| raw.body.as_str())
    }

    /// The HTTP status, if a response arrived.
    pub fn status(&self) -> Option<u16> {
        self.raw.as_ref().map(|raw| raw.status)
    }

    /// Returns `true` when a response arrived with a 4xx status.
    pub fn is_client_error(&self) -> bool {
        self.raw.as_ref().is_some_and(RawResponse::is_client_error)
    }

    /// Reads a top-level payload field as text.
    ///
    /// Strings are returned as-is and numbers or booleans in their display
    /// form; absent, `null` and structured values give `None`.
    pub fn response_key_value(&self, key: &str) -> Option<String> {
        match self.payload.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// The payload's `access_token` string.
    pub fn access_token(&self) -> Option<&str> {
        self.payload.get("access_token")?.as_str()
    }

    /// The payload's integer `code`.
    pub fn response_code(&self) -> Option<i64> {
        self.payload.get("code")?.as_i64()
    }

    /// The payload's `message` string.
    pub fn response_message(&self) -> Option<&str> {
        self.payload.get("message")?.as_str()
    }

    /// Produces the caller-facing result.
    pub fn into_result(self) -> RequestResult {
        match self.exception {
            Some(err) => err.into(),
            None => RequestResult::Success(self.payload),
        }
    }
}

/// Parses a body into a payload map.
///
/// Objects are used directly. Arrays become a map keyed by element index,
/// the way a list is addressed as a keyed collection.
pub(crate) fn parse_payload(body: &str) -> Result<Map<String, Value>, ValidationError> {
    match serde_json::from_str::<Value>(body)? {
        Value::Object(map) => Ok(map),
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .map(|(index, value)| (index.to_string(), value))
            .collect()),
        Value::String(_) => Err(ValidationError::UnexpectedPayload { kind: "string" }),
        Value::Number(_) => Err(ValidationError::UnexpectedPayload { kind: "number" }),
        Value::Bool(_) => Err(ValidationError::UnexpectedPayload { kind: "boolean" }),
        Value::Null => Err(ValidationError::UnexpectedPayload { kind: "null" }),
    }
}
