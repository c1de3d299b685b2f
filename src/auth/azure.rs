//! Azure identity provider.
//!
//! Two strategies, chosen from the environment at construction time:
//!
//! - **Service principal** (`AZURE_CLIENT_SECRET` present): only the
//!   client-secret credential is used. CLI sessions are never consulted, so a
//!   stale developer login cannot shadow the configured principal.
//! - **Delegated** (no secret): the developer-tools chain (Azure CLI, Azure
//!   Developer CLI). Interactive browser and IDE credentials are never part of
//!   the chain; this process runs headless.

use std::sync::Arc;

use async_trait::async_trait;
use azure_core::credentials::{Secret, TokenCredential};
use azure_core::error::ErrorKind;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::credential::{AccessToken, CredentialError, CredentialProvider};
use super::AuthError;
use crate::config::EnvSource;

pub const AZURE_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const AZURE_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const AZURE_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";

/// Which credential sources the Azure provider is allowed to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AzureStrategy {
    ServicePrincipal,
    Delegated,
}

impl AzureStrategy {
    pub fn from_env(env: &dyn EnvSource) -> Self {
        if env.is_set(AZURE_CLIENT_SECRET) {
            AzureStrategy::ServicePrincipal
        } else {
            AzureStrategy::Delegated
        }
    }

    /// Whether the Azure CLI / shell-session sources may be consulted.
    pub fn allows_cli_session(&self) -> bool {
        matches!(self, AzureStrategy::Delegated)
    }

    /// Interactive browser and IDE-embedded sources are never allowed.
    pub fn allows_interactive(&self) -> bool {
        false
    }
}

pub struct AzureCredentialProvider {
    strategy: AzureStrategy,
    credential: Arc<dyn TokenCredential>,
}

impl AzureCredentialProvider {
    pub fn from_env(env: &dyn EnvSource) -> Result<Self, AuthError> {
        let strategy = AzureStrategy::from_env(env);

        let credential: Arc<dyn TokenCredential> = match strategy {
            AzureStrategy::ServicePrincipal => {
                let tenant_id = env.non_empty(AZURE_TENANT_ID).ok_or_else(|| {
                    AuthError::Configuration(format!(
                        "{} is required for Service Principal authentication",
                        AZURE_TENANT_ID
                    ))
                })?;
                let client_id = env.non_empty(AZURE_CLIENT_ID).ok_or_else(|| {
                    AuthError::Configuration(format!(
                        "{} is required for Service Principal authentication",
                        AZURE_CLIENT_ID
                    ))
                })?;
                let secret = env.non_empty(AZURE_CLIENT_SECRET).unwrap_or_default();

                azure_identity::ClientSecretCredential::new(
                    &tenant_id,
                    client_id,
                    Secret::new(secret),
                    None,
                )
                .map_err(|e| {
                    AuthError::Configuration(format!(
                        "Failed to initialize Service Principal credential: {}",
                        e
                    ))
                })? as Arc<dyn TokenCredential>
            }
            AzureStrategy::Delegated => azure_identity::DeveloperToolsCredential::new(None)
                .map_err(|e| {
                    AuthError::Configuration(format!(
                        "Failed to initialize Azure CLI credential: {}",
                        e
                    ))
                })? as Arc<dyn TokenCredential>,
        };

        info!(strategy = ?strategy, "Initialized Azure credential");

        Ok(Self {
            strategy,
            credential,
        })
    }

    pub fn strategy(&self) -> AzureStrategy {
        self.strategy
    }
}

#[async_trait]
impl CredentialProvider for AzureCredentialProvider {
    fn name(&self) -> &str {
        match self.strategy {
            AzureStrategy::ServicePrincipal => "azure-service-principal",
            AzureStrategy::Delegated => "azure-delegated",
        }
    }

    async fn get_token(&self, scope: &str) -> Result<AccessToken, CredentialError> {
        debug!(scope = %scope, "Requesting Azure access token");

        let token = self
            .credential
            .get_token(&[scope], None)
            .await
            .map_err(classify_azure_error)?;

        let expires_on = DateTime::<Utc>::from_timestamp(token.expires_on.unix_timestamp(), 0)
            .ok_or_else(|| {
                CredentialError::Other("token expiry is out of range".to_string())
            })?;

        Ok(AccessToken::new(token.token.secret(), expires_on))
    }
}

fn classify_azure_error(err: azure_core::Error) -> CredentialError {
    let message = error_chain(&err);
    match err.kind() {
        ErrorKind::Credential => CredentialError::Authentication(message),
        _ => CredentialError::Other(message),
    }
}

/// Flatten an error and its sources into one line; the handler matches
/// known phrases anywhere in it.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(" - ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapEnv;

    #[test]
    fn test_secret_selects_service_principal() {
        let env = MapEnv::new()
            .with(AZURE_CLIENT_ID, "test")
            .with(AZURE_CLIENT_SECRET, "test-secret");
        let strategy = AzureStrategy::from_env(&env);
        assert_eq!(strategy, AzureStrategy::ServicePrincipal);
        assert!(!strategy.allows_cli_session());
        assert!(!strategy.allows_interactive());
    }

    #[test]
    fn test_no_secret_selects_delegated() {
        let env = MapEnv::new().with(AZURE_CLIENT_ID, "test");
        let strategy = AzureStrategy::from_env(&env);
        assert_eq!(strategy, AzureStrategy::Delegated);
        assert!(strategy.allows_cli_session());
        assert!(!strategy.allows_interactive());
    }

    #[test]
    fn test_empty_secret_is_delegated() {
        let env = MapEnv::new()
            .with(AZURE_CLIENT_ID, "test")
            .with(AZURE_CLIENT_SECRET, "");
        assert_eq!(AzureStrategy::from_env(&env), AzureStrategy::Delegated);
    }

    #[test]
    fn test_service_principal_requires_tenant() {
        let env = MapEnv::new()
            .with(AZURE_CLIENT_ID, "test")
            .with(AZURE_CLIENT_SECRET, "test-secret");
        let err = AzureCredentialProvider::from_env(&env).err().unwrap();
        assert!(matches!(err, AuthError::Configuration(_)));
        assert!(err.to_string().contains(AZURE_TENANT_ID));
    }
}
