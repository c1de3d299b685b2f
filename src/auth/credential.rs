//! Credential provider abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Tokens are treated as expired this many minutes before their real expiry.
pub const TOKEN_EXPIRY_BUFFER_MINUTES: i64 = 5;

/// A bearer token and the instant it stops being accepted.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_on: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_on,
        }
    }

    /// Usable only while `now < expires_on - 5 minutes`.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_on - Duration::minutes(TOKEN_EXPIRY_BUFFER_MINUTES)
    }
}

// Keep the secret out of logs and panics.
impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Raw failure reported by a credential provider, before it is translated
/// into a user-facing message by the auth handler.
#[derive(Debug, Clone, Error)]
pub enum CredentialError {
    /// The identity platform rejected or could not produce credentials.
    #[error("{0}")]
    Authentication(String),

    /// Anything else: network, timeouts, malformed responses.
    #[error("{0}")]
    Other(String),
}

/// Produces bearer tokens for a scope.
///
/// One implementation exists per cloud identity platform; the auth handler
/// holds exactly one of them.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Short name used in logs (e.g. "azure-service-principal").
    fn name(&self) -> &str;

    /// Request a fresh token for `scope`. Implementations do not cache.
    async fn get_token(&self, scope: &str) -> Result<AccessToken, CredentialError>;

    /// Release any held resources. Must be safe to call more than once.
    fn close(&self) {}
}

/// Hands out a caller-supplied token verbatim.
///
/// Used when a tool invocation carries its own `user_token`: OSDU validates
/// the token, we don't know its expiry, so it is reported as valid for an
/// hour and never refreshed.
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticTokenCredential {
    fn name(&self) -> &str {
        "user-token"
    }

    async fn get_token(&self, _scope: &str) -> Result<AccessToken, CredentialError> {
        let token = self.token.trim();
        let token = token.strip_prefix("Bearer ").unwrap_or(token);
        if token.is_empty() {
            return Err(CredentialError::Authentication(
                "empty user token".to_string(),
            ));
        }
        Ok(AccessToken::new(token, Utc::now() + Duration::hours(1)))
    }
}
