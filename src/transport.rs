//! HTTP transport boundary.
//!
//! The client never talks to `reqwest` directly: it hands a fully built
//! [`HttpRequest`] to a [`Transport`] and gets back the status code and
//! the raw body. [`ReqwestTransport`] is the production implementation;
//! tests inject their own.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use url::Url;

use crate::error::WecomError;

/// One outgoing HTTP call.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,

    /// Absolute URL, query string included.
    pub url: Url,

    /// Request headers.
    pub headers: HeaderMap,

    /// Request body, if any.
    pub body: Option<Vec<u8>>,

    /// Deadline for the whole round trip.
    pub timeout: Duration,
}

impl HttpRequest {
    /// Short description for logs and timeout errors, e.g. `GET /cgi-bin/user/get`.
    ///
    /// The query string is left out since it may carry credentials.
    pub fn describe(&self) -> String {
        format!("{} {}", self.method, self.url.path())
    }
}

/// The answer to one HTTP call, whatever its status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: StatusCode,

    /// Raw response body.
    pub body: Vec<u8>,
}

/// Executes one HTTP request.
///
/// Implementations return `Ok` for every response that arrived, including
/// non-2xx ones; status classification is the caller's job. `Err` is
/// reserved for failures where no response was received.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and waits for the complete response body.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, WecomError>;
}

/// [`Transport`] backed by a `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    /// The underlying HTTP client (cloning is cheap).
    http: Client,
}

impl ReqwestTransport {
    /// Creates a transport with a fresh `reqwest::Client`.
    ///
    /// Proxy settings are taken from the environment, as `reqwest` does
    /// by default.
    ///
    /// # Errors
    ///
    /// Returns `WecomError::HttpClient` if the HTTP client fails to initialize.
    pub fn new() -> Result<Self, WecomError> {
        let http = Client::builder().build().map_err(WecomError::HttpClient)?;
        Ok(Self { http })
    }

    /// Wraps an existing `reqwest::Client`.
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, WecomError> {
        let operation = request.describe();
        let timeout = request.timeout;

        tracing::debug!(operation = %operation, "Sending HTTP request");

        let mut req = self
            .http
            .request(request.method, request.url)
            .headers(request.headers)
            .timeout(timeout);

        if let Some(body) = request.body {
            req = req.body(body);
        }

        let map_err = |e: reqwest::Error| {
            // Check for timeout specifically
            if e.is_timeout() {
                return WecomError::timeout(timeout, operation.clone());
            }
            WecomError::Http(e)
        };

        let response = req.send().await.map_err(map_err)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_err)?.to_vec();

        tracing::debug!(operation = %operation, status = %status, "HTTP response received");

        Ok(HttpResponse { status, body })
    }
}
