//! Authentication against the OSDU platform.
//!
//! - [`detect_mode`] picks the cloud identity platform from the environment
//! - [`CredentialProvider`] produces raw tokens for that platform
//! - [`AuthHandler`] caches tokens, refreshes them ahead of expiry and turns
//!   provider failures into actionable [`AuthError`] messages
//! - [`SharedAuth`] holds the process-wide handler

mod azure;
mod credential;
mod handler;
mod shared;

pub use azure::{
    AzureCredentialProvider, AzureStrategy, AZURE_CLIENT_ID, AZURE_CLIENT_SECRET, AZURE_TENANT_ID,
};
pub use credential::{
    AccessToken, CredentialError, CredentialProvider, StaticTokenCredential,
    TOKEN_EXPIRY_BUFFER_MINUTES,
};
pub use handler::{map_credential_error, AuthHandler};
pub use shared::SharedAuth;

use std::fmt;

use thiserror::Error;
use tracing::warn;

use crate::config::{EnvSource, ENV_AUTH_MODE};

pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_REGION: &str = "AWS_REGION";
pub const GOOGLE_APPLICATION_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub const GOOGLE_CLOUD_PROJECT: &str = "GOOGLE_CLOUD_PROJECT";

/// Errors raised while obtaining credentials.
///
/// Messages are safe to show to a user: they never carry raw provider output
/// or credential material.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Environment doesn't describe a usable identity setup.
    #[error("{0}")]
    Configuration(String),

    /// Token acquisition failed. The message includes a remediation hint.
    #[error("{0}")]
    Authentication(String),

    /// The selected provider is recognised but has no implementation yet.
    #[error("{0}")]
    NotImplemented(String),

    #[error("Authentication handler has been closed")]
    Closed,
}

/// Cloud identity platform used to obtain OSDU tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthenticationMode {
    Azure,
    Aws,
    Gcp,
}

impl AuthenticationMode {
    pub const ALL: [AuthenticationMode; 3] = [
        AuthenticationMode::Azure,
        AuthenticationMode::Aws,
        AuthenticationMode::Gcp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthenticationMode::Azure => "azure",
            AuthenticationMode::Aws => "aws",
            AuthenticationMode::Gcp => "gcp",
        }
    }

    /// Parse an override value, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|m| m.as_str() == value)
    }

    /// Environment variables whose presence selects this mode, in the order
    /// they are checked.
    pub fn indicator_vars(&self) -> [&'static str; 2] {
        match self {
            AuthenticationMode::Azure => [AZURE_CLIENT_ID, AZURE_TENANT_ID],
            AuthenticationMode::Aws => [AWS_ACCESS_KEY_ID, AWS_REGION],
            AuthenticationMode::Gcp => [GOOGLE_APPLICATION_CREDENTIALS, GOOGLE_CLOUD_PROJECT],
        }
    }
}

impl fmt::Display for AuthenticationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Choose the authentication mode.
///
/// Provider indicator variables are checked Azure, then AWS, then GCP; the
/// first match is the detected mode. A recognised `OSDU_MCP_AUTH_MODE` value
/// replaces whatever was detected.
pub fn detect_mode(env: &dyn EnvSource) -> Result<AuthenticationMode, AuthError> {
    let detected = AuthenticationMode::ALL
        .into_iter()
        .find(|mode| mode.indicator_vars().iter().any(|var| env.is_set(var)));

    if let Some(raw) = env.non_empty(ENV_AUTH_MODE) {
        match AuthenticationMode::parse(&raw) {
            Some(explicit) => {
                if let Some(detected) = detected.filter(|d| *d != explicit) {
                    warn!(
                        detected = %detected,
                        explicit = %explicit,
                        "{} overrides the auto-detected authentication mode",
                        ENV_AUTH_MODE
                    );
                }
                return Ok(explicit);
            }
            None => {
                warn!(value = %raw, "Ignoring unsupported {} value", ENV_AUTH_MODE);
            }
        }
    }

    detected.ok_or_else(|| {
        AuthError::Configuration(format!(
            "Cannot detect authentication mode from environment variables. \
             Set Azure ({}), AWS ({}), or GCP ({}) credentials.",
            AZURE_CLIENT_ID, AWS_ACCESS_KEY_ID, GOOGLE_APPLICATION_CREDENTIALS
        ))
    })
}
