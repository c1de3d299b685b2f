use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::OsduError;
use super::transport::{HttpTransport, OsduRequest, OsduResponse};
use crate::auth::AuthHandler;

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_DATA_PARTITION: &str = "data-partition-id";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_CORRELATION_ID: &str = "correlation-id";

/// Generic authenticated client for the OSDU REST API.
///
/// Paths passed to the verb methods are absolute on the server
/// (`/api/legal/v1/...`); service clients add their base path first.
#[derive(Clone)]
pub struct OsduClient {
    base_url: String,
    data_partition: String,
    auth: Arc<AuthHandler>,
    transport: Arc<dyn HttpTransport>,
}

impl OsduClient {
    pub fn new(
        base_url: impl Into<String>,
        data_partition: impl Into<String>,
        auth: Arc<AuthHandler>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            data_partition: data_partition.into(),
            auth,
            transport,
        }
    }

    pub fn data_partition(&self) -> &str {
        &self.data_partition
    }

    pub fn auth(&self) -> &AuthHandler {
        &self.auth
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, OsduError> {
        self.request(Method::GET, path, query, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value, OsduError> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: Value,
    ) -> Result<Value, OsduError> {
        self.request(Method::PUT, path, query, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<Value, OsduError> {
        self.request(Method::PATCH, path, &[], Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, OsduError> {
        self.request(Method::DELETE, path, &[], None).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Value, OsduError> {
        let token = self.auth.get_access_token().await?;
        let trace_id = Uuid::new_v4().to_string();

        let request = OsduRequest {
            method: method.clone(),
            url: format!("{}{}", self.base_url, path),
            headers: vec![
                (HEADER_AUTHORIZATION.to_string(), format!("Bearer {}", token)),
                (HEADER_DATA_PARTITION.to_string(), self.data_partition.clone()),
                (
                    HEADER_CONTENT_TYPE.to_string(),
                    "application/json".to_string(),
                ),
                (HEADER_CORRELATION_ID.to_string(), trace_id.clone()),
            ],
            query: query
                .iter()
                .map(|(key, value)| (key.to_string(), value.clone()))
                .collect(),
            body,
        };

        debug!(method = %method, path = %path, trace_id = %trace_id, "Sending OSDU request");
        let response = self.transport.send(request).await?;
        handle_response(response, path, &trace_id)
    }
}

fn handle_response(response: OsduResponse, path: &str, trace_id: &str) -> Result<Value, OsduError> {
    let status = response.status;

    if (200..300).contains(&status) {
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        return serde_json::from_str(&response.body).map_err(|e| {
            OsduError::Serialization(format!("Invalid JSON response from {}: {}", path, e))
        });
    }

    warn!(status, path = %path, trace_id = %trace_id, "OSDU request failed");

    if status == 404 {
        return Err(OsduError::NotFound(format!("Resource not found: {}", path)));
    }

    Err(OsduError::Upstream {
        status,
        body: response.body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> OsduResponse {
        OsduResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_empty_success_body_is_null() {
        let value = handle_response(response(204, ""), "/x", "t").unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn test_json_body_is_returned_verbatim() {
        let value = handle_response(
            response(200, r#"{"acl":{"viewers":["a"]},"kind":"k"}"#),
            "/x",
            "t",
        )
        .unwrap();
        assert_eq!(value["acl"]["viewers"][0], "a");
        assert_eq!(value["kind"], "k");
    }

    #[test]
    fn test_not_found_mapping() {
        let err = handle_response(response(404, "gone"), "/api/x", "t").unwrap_err();
        assert!(matches!(err, OsduError::NotFound(_)));
    }

    #[test]
    fn test_upstream_mapping_preserves_status_and_body() {
        let err = handle_response(response(409, "already exists"), "/x", "t").unwrap_err();
        match err {
            OsduError::Upstream { status, body } => {
                assert_eq!(status, 409);
                assert_eq!(body, "already exists");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        let err = handle_response(response(200, "<html>"), "/x", "t").unwrap_err();
        assert!(matches!(err, OsduError::Serialization(_)));
    }
}
