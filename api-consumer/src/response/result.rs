//! The uniform outcome of a dispatch.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Error details reported to the caller in place of a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    /// Status code carried by the failure, if it had one.
    pub error_code: Option<i64>,
    pub error_message: String,
}

impl From<&ApiError> for ErrorPayload {
    fn from(err: &ApiError) -> Self {
        Self {
            error_code: err.code(),
            error_message: err.to_string(),
        }
    }
}

/// Result of one [`Dispatcher::send`](crate::Dispatcher::send).
///
/// Exactly one variant is produced per dispatch; callers inspect it rather
/// than handling an `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestResult {
    /// The parsed JSON payload (empty when the body was empty).
    Success(Map<String, Value>),
    /// What went wrong.
    Failure(ErrorPayload),
}

impl RequestResult {
    /// Returns `true` for [`RequestResult::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the payload of a successful result.
    pub fn payload(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Success(payload) => Some(payload),
            Self::Failure(_) => None,
        }
    }

    /// Returns the error of a failed result.
    pub fn error(&self) -> Option<&ErrorPayload> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// Flattens the result into a single map: the payload on success, or
    /// `{"errorCode": .., "errorMessage": ..}` on failure.
    pub fn into_response(self) -> Map<String, Value> {
        match self {
            Self::Success(payload) => payload,
            Self::Failure(error) => {
                let mut map = Map::new();
                map.insert(
                    "errorCode".to_string(),
                    error.error_code.map_or(Value::Null, Value::from),
                );
                map.insert(
                    "errorMessage".to_string(),
                    Value::String(error.error_message),
                );
                map
            }
        }
    }
}

impl From<ApiError> for RequestResult {
    fn from(err: ApiError) -> Self {
        Self::Failure(ErrorPayload::from(&err))
    }
}
