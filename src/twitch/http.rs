//! HTTP transport abstraction for the Twitch API
//!
//! This module provides a trait-based HTTP client that can be easily mocked
//! for testing.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;

/// Connection-level failure, distinct from a non-2xx status code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("network error: {0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self(err.to_string())
    }
}

/// Trait for performing a single HTTP request/response exchange.
///
/// This abstraction allows easy mocking of HTTP calls in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Performs one request and returns the response, however the remote
    /// answered. Only connection-level problems are errors.
    async fn request(
        &self,
        method: Method,
        url: &str,
        headers: &HeaderMap,
        body: Option<String>,
    ) -> Result<HttpResponse, TransportError>;
}

/// Response from an HTTP request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns true if status is in 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the body as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserializes the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Production HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new reqwest-based HTTP client
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn request(
        &self,
        method: Method,
        url: &str,
        headers: &HeaderMap,
        body: Option<String>,
    ) -> Result<HttpResponse, TransportError> {
        let mut request = self.inner.request(method, url).headers(headers.clone());
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, RwLock};

    /// Mock transport for testing
    ///
    /// Allows setting up canned responses per method and URL, and records
    /// every request made through it.
    #[derive(Debug, Clone, Default)]
    pub struct MockTransport {
        responses: Arc<RwLock<HashMap<(Method, String), MockResponse>>>,
        requests: Arc<RwLock<Vec<RecordedRequest>>>,
    }

    /// A recorded HTTP request
    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub method: Method,
        pub url: String,
        pub headers: HeaderMap,
        pub body: Option<String>,
    }

    /// A mock response configuration
    #[derive(Debug, Clone)]
    struct MockResponse {
        status: u16,
        body: String,
    }

    impl MockTransport {
        /// Creates a new mock transport
        pub fn new() -> Self {
            Self::default()
        }

        /// Configures a response for a method and URL
        pub fn on(self, method: Method, url: &str, status: u16, body: impl Into<String>) -> Self {
            self.responses.write().unwrap().insert(
                (method, url.to_string()),
                MockResponse {
                    status,
                    body: body.into(),
                },
            );
            self
        }

        /// Configures a successful JSON response for a method and URL
        pub fn on_json<T: serde::Serialize>(self, method: Method, url: &str, data: &T) -> Self {
            let body = serde_json::to_string(data).expect("Failed to serialize mock data");
            self.on(method, url, 200, body)
        }

        /// Returns all recorded requests
        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.read().unwrap().clone()
        }

        /// Returns the number of requests made
        pub fn request_count(&self) -> usize {
            self.requests.read().unwrap().len()
        }
    }

    #[async_trait]
    impl HttpClient for MockTransport {
        async fn request(
            &self,
            method: Method,
            url: &str,
            headers: &HeaderMap,
            body: Option<String>,
        ) -> Result<HttpResponse, TransportError> {
            self.requests.write().unwrap().push(RecordedRequest {
                method: method.clone(),
                url: url.to_string(),
                headers: headers.clone(),
                body,
            });

            let responses = self.responses.read().unwrap();
            let mock_response = responses
                .get(&(method, url.to_string()))
                .ok_or_else(|| TransportError(format!("no mock response configured for {url}")))?;

            Ok(HttpResponse {
                status: mock_response.status,
                body: mock_response.body.clone().into_bytes(),
            })
        }
    }
}
