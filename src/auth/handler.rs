//! Token lifecycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::azure::{AzureCredentialProvider, AZURE_CLIENT_ID, AZURE_CLIENT_SECRET, AZURE_TENANT_ID};
use super::credential::{AccessToken, CredentialError, CredentialProvider, StaticTokenCredential};
use super::{detect_mode, AuthError, AuthenticationMode};
use crate::config::EnvSource;

/// Produces bearer tokens for one authentication mode.
///
/// The cached token is shared state: concurrent callers that find it stale
/// are serialized on `refresh`, so only the first one goes to the provider
/// and the rest reuse its result.
pub struct AuthHandler {
    /// `None` for handlers around a caller-supplied token.
    mode: Option<AuthenticationMode>,
    client_id: Option<String>,
    has_client_secret: bool,
    credential: Box<dyn CredentialProvider>,
    cached: Mutex<Option<AccessToken>>,
    refresh: tokio::sync::Mutex<()>,
    closed: AtomicBool,
}

impl AuthHandler {
    /// Detect the mode from `env` and build the matching provider.
    pub fn from_env(env: &dyn EnvSource) -> Result<Self, AuthError> {
        let mode = detect_mode(env)?;
        info!(mode = %mode, "Selected authentication mode");

        let credential: Box<dyn CredentialProvider> = match mode {
            AuthenticationMode::Azure => Box::new(AzureCredentialProvider::from_env(env)?),
            AuthenticationMode::Aws => return Err(not_implemented("AWS")),
            AuthenticationMode::Gcp => return Err(not_implemented("GCP")),
        };

        Ok(Self {
            mode: Some(mode),
            client_id: env.non_empty(AZURE_CLIENT_ID),
            has_client_secret: env.is_set(AZURE_CLIENT_SECRET),
            credential,
            cached: Mutex::new(None),
            refresh: tokio::sync::Mutex::new(()),
            closed: AtomicBool::new(false),
        })
    }

    /// Build a handler around an already constructed provider.
    pub fn with_credential(
        mode: AuthenticationMode,
        client_id: Option<String>,
        credential: Box<dyn CredentialProvider>,
    ) -> Self {
        Self {
            mode: Some(mode),
            client_id,
            has_client_secret: false,
            credential,
            cached: Mutex::new(None),
            refresh: tokio::sync::Mutex::new(()),
            closed: AtomicBool::new(false),
        }
    }

    /// A handler that always hands out the caller's own token. It belongs to
    /// no identity platform and requests no scope.
    pub fn with_user_token(token: impl Into<String>) -> Self {
        Self {
            mode: None,
            client_id: None,
            has_client_secret: false,
            credential: Box::new(StaticTokenCredential::new(token)),
            cached: Mutex::new(None),
            refresh: tokio::sync::Mutex::new(()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn mode(&self) -> Option<AuthenticationMode> {
        self.mode
    }

    pub fn provider_name(&self) -> &str {
        self.credential.name()
    }

    /// OAuth scope requested from the provider: `{client_id}/.default`.
    /// `None` when the token is caller-supplied.
    pub fn scope(&self) -> Result<Option<String>, AuthError> {
        if self.mode.is_none() {
            return Ok(None);
        }
        let client_id = self.client_id.as_deref().ok_or_else(|| {
            AuthError::Authentication(format!(
                "{} environment variable is required for Azure authentication",
                AZURE_CLIENT_ID
            ))
        })?;
        Ok(Some(format!("{}/.default", client_id)))
    }

    /// Return a token valid for at least five more minutes, fetching a new
    /// one only when the cached token is missing or too close to expiry.
    pub async fn get_access_token(&self) -> Result<String, AuthError> {
        self.ensure_open()?;

        if let Some(token) = self.usable_cached_token() {
            return Ok(token);
        }

        let _guard = self.refresh.lock().await;
        self.ensure_open()?;

        // Another caller may have refreshed while we waited.
        if let Some(token) = self.usable_cached_token() {
            return Ok(token);
        }

        let scope = self.scope()?.unwrap_or_default();
        debug!(provider = self.credential.name(), "Fetching new access token");

        let token = self
            .credential
            .get_token(&scope)
            .await
            .map_err(|e| map_credential_error(e, self.has_client_secret))?;

        // close() doesn't wait for in-flight fetches; a late token is dropped.
        self.ensure_open()?;

        let value = token.token.clone();
        if let Ok(mut cached) = self.cached.lock() {
            *cached = Some(token);
        }
        Ok(value)
    }

    /// `Ok(true)` if a token can be obtained, `Ok(false)` if token
    /// acquisition failed authentication. Every other error is returned as is.
    pub async fn validate_token(&self) -> Result<bool, AuthError> {
        match self.get_access_token().await {
            Ok(_) => Ok(true),
            Err(AuthError::Authentication(message)) => {
                debug!(reason = %message, "Token validation failed");
                Ok(false)
            }
            Err(other) => Err(other),
        }
    }

    /// Drop the cached token and release the provider. Idempotent; the
    /// handler can't be used afterwards.
    pub fn close(&self) {
        if let Ok(mut cached) = self.cached.lock() {
            *cached = None;
        }
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.credential.close();
            debug!(provider = self.credential.name(), "Auth handler closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Whether a token is currently cached (usable or not).
    pub fn has_cached_token(&self) -> bool {
        self.cached.lock().map(|c| c.is_some()).unwrap_or(false)
    }

    fn usable_cached_token(&self) -> Option<String> {
        let cached = self.cached.lock().ok()?;
        cached
            .as_ref()
            .filter(|t| t.is_usable_at(Utc::now()))
            .map(|t| t.token.clone())
    }

    fn ensure_open(&self) -> Result<(), AuthError> {
        if self.is_closed() {
            Err(AuthError::Closed)
        } else {
            Ok(())
        }
    }
}

impl Drop for AuthHandler {
    fn drop(&mut self) {
        self.close();
    }
}

fn not_implemented(provider: &str) -> AuthError {
    AuthError::NotImplemented(format!(
        "{} authentication not yet implemented. Please use Azure authentication by setting {} and {}.",
        provider, AZURE_CLIENT_ID, AZURE_TENANT_ID
    ))
}

/// Translate a provider failure into a user-facing message. Provider text is
/// only inspected, never forwarded.
pub fn map_credential_error(err: CredentialError, has_client_secret: bool) -> AuthError {
    match err {
        CredentialError::Authentication(raw) => {
            let raw = raw.to_lowercase();
            let message = if raw.contains("az login") || raw.contains("azurecli") {
                "Authentication failed. Please run 'az login' before using OSDU MCP Server"
                    .to_string()
            } else if raw.contains("expired") || raw.contains("refresh token") {
                "Azure authentication token expired. Please run 'az login' to refresh".to_string()
            } else if raw.contains("invalid_scope") || raw.contains("scope format is invalid") {
                format!(
                    "Invalid Azure client ID. Please verify your {} is correct",
                    AZURE_CLIENT_ID
                )
            } else if raw.contains("no accounts were found")
                || raw.contains("environment variables are not fully configured")
            {
                if has_client_secret {
                    format!(
                        "Service Principal authentication failed. Please check your {}, {}, and {} environment variables",
                        AZURE_CLIENT_ID, AZURE_TENANT_ID, AZURE_CLIENT_SECRET
                    )
                } else {
                    "No Azure credentials found. Please set up Service Principal credentials \
                     or run 'az login' for CLI authentication"
                        .to_string()
                }
            } else {
                "Authentication failed. Please check your Azure credentials".to_string()
            };
            warn!(reason = %message, "Credential provider rejected token request");
            AuthError::Authentication(message)
        }
        CredentialError::Other(raw) => {
            let raw = raw.to_lowercase();
            let message = if raw.contains("connection") || raw.contains("timeout") {
                "Failed to connect to Azure authentication service. Please check your network connection"
            } else {
                "Authentication configuration error. Please check your environment setup"
            };
            warn!(reason = %message, "Token request failed");
            AuthError::Authentication(message.to_string())
        }
    }
}
