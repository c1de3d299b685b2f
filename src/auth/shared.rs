use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use super::{AuthError, AuthHandler};
use crate::config::EnvSource;

/// Process-wide [`AuthHandler`], built on first use.
///
/// Construction failures are not cached: a later call retries, so fixing the
/// environment (e.g. `az login`) doesn't require a restart.
pub struct SharedAuth {
    env: Arc<dyn EnvSource>,
    slot: Mutex<Option<Arc<AuthHandler>>>,
}

impl SharedAuth {
    pub fn lazy(env: Arc<dyn EnvSource>) -> Self {
        Self {
            env,
            slot: Mutex::new(None),
        }
    }

    /// Wrap an existing handler.
    pub fn with_handler(env: Arc<dyn EnvSource>, handler: AuthHandler) -> Self {
        Self {
            env,
            slot: Mutex::new(Some(Arc::new(handler))),
        }
    }

    pub async fn get(&self) -> Result<Arc<AuthHandler>, AuthError> {
        let mut slot = self.slot.lock().await;
        if let Some(handler) = slot.as_ref().filter(|h| !h.is_closed()) {
            return Ok(handler.clone());
        }

        let handler = Arc::new(AuthHandler::from_env(self.env.as_ref())?);
        *slot = Some(handler.clone());
        Ok(handler)
    }

    /// Close and forget the current handler, if any.
    pub async fn close(&self) {
        if let Some(handler) = self.slot.lock().await.take() {
            handler.close();
            debug!("Shared auth handler released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticationMode;
    use crate::auth::StaticTokenCredential;
    use crate::config::MapEnv;

    #[tokio::test]
    async fn test_reuses_injected_handler() {
        let handler = AuthHandler::with_credential(
            AuthenticationMode::Azure,
            Some("abc".to_string()),
            Box::new(StaticTokenCredential::new("T")),
        );
        let shared = SharedAuth::with_handler(Arc::new(MapEnv::new()), handler);

        let first = shared.get().await.unwrap();
        let second = shared.get().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let shared = SharedAuth::lazy(Arc::new(MapEnv::new()));
        assert!(matches!(
            shared.get().await,
            Err(AuthError::Configuration(_))
        ));
        assert!(shared.get().await.is_err());
    }

    #[tokio::test]
    async fn test_close_closes_handler() {
        let handler = AuthHandler::with_user_token("T");
        let shared = SharedAuth::with_handler(Arc::new(MapEnv::new()), handler);
        let held = shared.get().await.unwrap();
        shared.close().await;
        assert!(held.is_closed());
        // closing twice is fine
        shared.close().await;
    }
}
