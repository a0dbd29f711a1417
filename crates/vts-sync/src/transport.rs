//! HTTP transport seam.
//!
//! The GitHub client only speaks [`HttpRequest`] / [`HttpResponse`], so the
//! sync protocol can be driven by a scripted transport in tests.
//! [`ReqwestTransport`] is the real one.

use std::fmt;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, SyncError};

/// Default GitHub API base URL.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// User agent string for API requests.
const USER_AGENT_VALUE: &str = concat!("variable-token-sync/", env!("CARGO_PKG_VERSION"));

/// HTTP method used by the sync protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        })
    }
}

/// A request relative to the API base, e.g. `GET /user`.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Path and query, starting with `/`.
    pub path: String,
    /// JSON body.
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// Status and body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// Creates a response with a JSON body.
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parses the body.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Converts a response into an error carrying its status and body.
    #[must_use]
    pub fn into_error(self) -> SyncError {
        SyncError::Status {
            status: self.status,
            body: self.body,
        }
    }
}

/// Sends requests to the GitHub API.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request. Any status is a successful send; only failures to
    /// get a response are errors.
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// [`Transport`] over `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    api_base: String,
}

impl ReqwestTransport {
    /// Creates a transport authenticated with a bearer token.
    ///
    /// The token header is marked sensitive so it never shows up in debug
    /// output.
    pub fn new(api_base: impl Into<String>, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| {
                SyncError::InvalidToken("token contains characters not allowed in a header".to_string())
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| SyncError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let url = self.url(&request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!(method = %request.method, path = %request.path, status, "GitHub request");

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transport_creation() {
        let transport = ReqwestTransport::new("https://api.github.com/", "ghp_test");
        assert!(transport.is_ok());
        let transport = transport.unwrap();
        assert_eq!(transport.url("/user"), "https://api.github.com/user");
    }

    #[test]
    fn test_malformed_token_points_at_token() {
        let err = ReqwestTransport::new(GITHUB_API_URL, "ghp_abc\ndef").unwrap_err();
        assert!(matches!(err, SyncError::InvalidToken(_)));
        assert!(!err.is_retryable());
        assert!(err.user_message().contains("token"));
        assert!(err.suggestion().unwrap().contains("--token"));
    }

    #[test]
    fn test_response_helpers() {
        let ok = HttpResponse::json(201, &json!({"login": "octocat"}));
        assert!(ok.is_success());
        let value: Value = ok.parse().unwrap();
        assert_eq!(value["login"], "octocat");

        let missing = HttpResponse {
            status: 404,
            body: "Not Found".to_string(),
        };
        assert!(!missing.is_success());
        assert_eq!(missing.into_error().status(), Some(404));
    }
}
