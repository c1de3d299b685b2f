use thiserror::Error;

use crate::auth::AuthError;

/// Failures surfaced by the OSDU client layer.
///
/// Every variant carries a message that is safe to show to the caller.
#[derive(Debug, Clone, Error)]
pub enum OsduError {
    /// A feature flag rejected the operation before any request was made.
    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    NotFound(String),

    /// Caller input was rejected locally (missing confirmation, limits, ...).
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    NotImplemented(String),

    /// Any other non-2xx answer. The body is kept verbatim.
    #[error("OSDU API error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl OsduError {
    /// HTTP-equivalent status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            OsduError::PermissionDenied(_) => 403,
            OsduError::NotFound(_) => 404,
            OsduError::Validation(_) => 400,
            OsduError::Authentication(_) => 401,
            OsduError::NotImplemented(_) => 501,
            OsduError::Upstream { status, .. } => *status,
            OsduError::Connection(_) => 502,
            OsduError::Timeout(_) => 504,
            OsduError::Serialization(_) => 500,
        }
    }

    /// Stable machine-readable category name.
    pub fn kind(&self) -> &'static str {
        match self {
            OsduError::PermissionDenied(_) => "permission_denied",
            OsduError::NotFound(_) => "not_found",
            OsduError::Validation(_) => "validation_error",
            OsduError::Authentication(_) => "authentication_error",
            OsduError::NotImplemented(_) => "not_implemented",
            OsduError::Upstream { .. } => "upstream_error",
            OsduError::Connection(_) => "connection_error",
            OsduError::Timeout(_) => "timeout",
            OsduError::Serialization(_) => "serialization_error",
        }
    }
}

impl From<AuthError> for OsduError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotImplemented(message) => OsduError::NotImplemented(message),
            other => OsduError::Authentication(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for OsduError {
    fn from(err: serde_json::Error) -> Self {
        OsduError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(OsduError::PermissionDenied(String::new()).status_code(), 403);
        assert_eq!(OsduError::NotFound(String::new()).status_code(), 404);
        assert_eq!(OsduError::Validation(String::new()).status_code(), 400);
        assert_eq!(OsduError::Authentication(String::new()).status_code(), 401);
        assert_eq!(
            OsduError::Upstream {
                status: 409,
                body: "conflict".to_string()
            }
            .status_code(),
            409
        );
    }

    #[test]
    fn test_auth_error_conversion() {
        let err: OsduError = AuthError::NotImplemented("AWS".to_string()).into();
        assert!(matches!(err, OsduError::NotImplemented(_)));

        let err: OsduError = AuthError::Configuration("no creds".to_string()).into();
        assert!(matches!(err, OsduError::Authentication(ref m) if m == "no creds"));

        let err: OsduError = AuthError::Closed.into();
        assert_eq!(err.kind(), "authentication_error");
    }

    #[test]
    fn test_upstream_keeps_body() {
        let err = OsduError::Upstream {
            status: 500,
            body: r#"{"reason":"boom"}"#.to_string(),
        };
        assert!(err.to_string().contains(r#"{"reason":"boom"}"#));
    }
}
