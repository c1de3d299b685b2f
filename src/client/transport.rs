//! HTTP transport seam.
//!
//! [`OsduClient`](super::OsduClient) builds fully-resolved requests and hands
//! them to an [`HttpTransport`]. Production uses [`ReqwestTransport`]; tests
//! substitute a recording fake.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use super::error::OsduError;

/// A single outbound request, headers included.
#[derive(Debug, Clone)]
pub struct OsduRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl OsduRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct OsduResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send the request. Only transport-level failures are errors; any HTTP
    /// status is returned as a response.
    async fn send(&self, request: OsduRequest) -> Result<OsduResponse, OsduError>;
}

/// [`HttpTransport`] backed by a shared `reqwest::Client`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, OsduError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OsduError::Connection(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: OsduRequest) -> Result<OsduResponse, OsduError> {
        let mut builder = self.client.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                OsduError::Timeout(format!("{} {} timed out", request.method, request.url))
            } else {
                OsduError::Connection(format!(
                    "Failed to reach {}: {}",
                    request.url,
                    e.without_url()
                ))
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                OsduError::Timeout(format!("Reading response from {} timed out", request.url))
            } else {
                OsduError::Connection(format!("Failed to read response body: {}", e))
            }
        })?;

        debug!(status, url = %request.url, "OSDU response received");
        Ok(OsduResponse { status, body })
    }
}
