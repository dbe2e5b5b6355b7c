//! The HTTP transport seam and its reqwest implementation.

use std::future::Future;
use std::time::Duration;

use reqwest::header::HeaderMap;
use serde_json::{Map, Value};
use url::Url;

use crate::error::ClientError;
use crate::hydrate::query_pairs;
use crate::method::RestMethod;
use crate::response::RawResponse;

/// Default request timeout in seconds.
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A fully resolved request, ready to put on the wire.
///
/// Produced by [`Dispatcher::prepare`](crate::Dispatcher::prepare): the URL
/// is absolute and hydrated, any concatenated query string is already part
/// of it, headers are validated, and auth has been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: RestMethod,
    pub url: Url,
    pub headers: HeaderMap,
    /// Sent as the query string for GET and as a JSON body otherwise.
    pub params: Map<String, Value>,
    /// `(username, password)` for HTTP basic auth.
    pub basic_auth: Option<(String, String)>,
}

impl PreparedRequest {
    /// Params rendered as query pairs, flattened the same way as a
    /// concatenated query string.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        query_pairs(&self.params)
    }
}

/// Sends a [`PreparedRequest`] and returns the raw response.
///
/// An HTTP error status is a successful send; only failures to obtain a
/// response at all are errors.
pub trait Transport: Send + Sync {
    /// Performs one round trip.
    fn send(
        &self,
        request: &PreparedRequest,
    ) -> impl Future<Output = Result<RawResponse, ClientError>> + Send;
}

/// [`Transport`] backed by `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Creates a transport with the given timeout and default headers.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(timeout: Duration, default_headers: HeaderMap) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()
            .map_err(ClientError::Request)?;

        Ok(Self { client, timeout })
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn classify(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout {
                duration_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else if err.is_connect() {
            ClientError::Connection(err.to_string())
        } else {
            ClientError::Request(err)
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse, ClientError> {
        let mut builder = self
            .client
            .request(request.method.to_reqwest(), request.url.clone())
            .headers(request.headers.clone());

        if let Some((username, password)) = &request.basic_auth {
            builder = builder.basic_auth(username, Some(password));
        }

        if !request.params.is_empty() {
            builder = if request.method.sends_body() {
                builder.json(&request.params)
            } else {
                builder.query(&request.query_pairs())
            };
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(method: RestMethod, url: &str) -> PreparedRequest {
        PreparedRequest {
            method,
            url: Url::parse(url).unwrap(),
            headers: HeaderMap::new(),
            params: Map::new(),
            basic_auth: None,
        }
    }

    #[tokio::test]
    async fn test_get_sends_params_as_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/items"))
            .and(query_param("limit", "10"))
            .and(query_param("q", "a b"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
            .mount(&mock_server)
            .await;

        let mut req = request(RestMethod::Get, &format!("{}/items", mock_server.uri()));
        req.params.insert("limit".to_string(), json!(10));
        req.params.insert("q".to_string(), json!("a b"));

        let raw = ReqwestTransport::default().send(&req).await.unwrap();
        assert_eq!(raw.status, 200);
        assert_eq!(raw.body, r#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn test_post_sends_params_as_json_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/items"))
            .and(body_json(json!({"name": "widget", "count": 2})))
            .respond_with(ResponseTemplate::new(201).set_body_string("{}"))
            .mount(&mock_server)
            .await;

        let mut req = request(RestMethod::Post, &format!("{}/items", mock_server.uri()));
        req.params.insert("name".to_string(), json!("widget"));
        req.params.insert("count".to_string(), json!(2));

        let raw = ReqwestTransport::default().send(&req).await.unwrap();
        assert_eq!(raw.status, 201);
    }

    #[tokio::test]
    async fn test_basic_auth_and_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/items/1"))
            .and(header("x-custom", "yes"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let mut req = request(RestMethod::Delete, &format!("{}/items/1", mock_server.uri()));
        req.headers.insert("x-custom", "yes".parse().unwrap());
        req.basic_auth = Some(("user".to_string(), "pass".to_string()));

        let raw = ReqwestTransport::default().send(&req).await.unwrap();
        assert_eq!(raw.status, 204);
        assert!(raw.body.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_a_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message":"nope"}"#))
            .mount(&mock_server)
            .await;

        let req = request(RestMethod::Get, &format!("{}/missing", mock_server.uri()));
        let raw = ReqwestTransport::default().send(&req).await.unwrap();
        assert_eq!(raw.status, 404);
        assert!(raw.is_client_error());
    }

    #[tokio::test]
    async fn test_timeout_is_classified() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&mock_server)
            .await;

        let transport =
            ReqwestTransport::new(Duration::from_millis(50), HeaderMap::new()).unwrap();
        let req = request(RestMethod::Get, &format!("{}/slow", mock_server.uri()));

        let err = transport.send(&req).await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout { duration_ms: 50 }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_classified() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let req = request(RestMethod::Get, &format!("http://127.0.0.1:{port}/closed"));

        let err = ReqwestTransport::default().send(&req).await.unwrap_err();
        assert!(matches!(err, ClientError::Connection(_)), "got {err:?}");
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_query_pairs_render_values() {
        let mut req = request(RestMethod::Get, "https://example.com/");
        req.params.insert("n".to_string(), json!(1));
        req.params.insert("empty".to_string(), Value::Null);
        req.params.insert("flag".to_string(), json!(true));
        assert_eq!(
            req.query_pairs(),
            vec![
                ("n".to_string(), "1".to_string()),
                ("flag".to_string(), "1".to_string())
            ]
        );
    }
}
