//! MCP Tool Execution Context
//!
//! Gives tool, resource and prompt handlers access to configuration,
//! authentication and the HTTP transport.

use std::sync::Arc;

use crate::auth::{AuthHandler, SharedAuth};
use crate::client::{
    EntitlementsClient, HttpTransport, LegalClient, OsduClient, OsduError, PartitionClient,
    SchemaClient, Service, ServiceClient, StorageClient,
};
use crate::config::{AppConfig, EnvSource};

/// Context provided to tool and resource handlers during execution
#[derive(Clone)]
pub struct ToolContext {
    /// Static settings resolved at startup
    pub config: Arc<AppConfig>,

    /// Live environment, read by permission gates on every call
    pub env: Arc<dyn EnvSource>,

    /// Process-wide auth handler
    pub auth: Arc<SharedAuth>,

    pub transport: Arc<dyn HttpTransport>,

    /// Server version info
    pub server_version: String,

    /// Server start time (for uptime calculation)
    pub start_time: std::time::Instant,
}

impl ToolContext {
    pub fn new(
        config: Arc<AppConfig>,
        env: Arc<dyn EnvSource>,
        auth: Arc<SharedAuth>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            config,
            env,
            auth,
            transport,
            server_version: server_version(),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn data_partition(&self) -> &str {
        &self.config.data_partition
    }

    /// The shared handler, or a one-off handler around `user_token`.
    pub async fn auth_handler(
        &self,
        user_token: Option<&str>,
    ) -> Result<Arc<AuthHandler>, OsduError> {
        match user_token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => Ok(Arc::new(AuthHandler::with_user_token(token))),
            None => Ok(self.auth.get().await?),
        }
    }

    pub async fn rest_client(&self, user_token: Option<&str>) -> Result<OsduClient, OsduError> {
        let auth = self.auth_handler(user_token).await?;
        Ok(OsduClient::new(
            self.config.server_url.clone(),
            self.config.data_partition.clone(),
            auth,
            self.transport.clone(),
        ))
    }

    pub async fn service_client(
        &self,
        service: Service,
        user_token: Option<&str>,
    ) -> Result<ServiceClient, OsduError> {
        let rest = self.rest_client(user_token).await?;
        Ok(ServiceClient::new(service, rest, self.env.clone()))
    }

    pub async fn legal_client(&self, user_token: Option<&str>) -> Result<LegalClient, OsduError> {
        Ok(LegalClient::new(
            self.service_client(Service::Legal, user_token).await?,
        ))
    }

    pub async fn schema_client(
        &self,
        user_token: Option<&str>,
    ) -> Result<SchemaClient, OsduError> {
        Ok(SchemaClient::new(
            self.service_client(Service::Schema, user_token).await?,
        ))
    }

    pub async fn storage_client(
        &self,
        user_token: Option<&str>,
    ) -> Result<StorageClient, OsduError> {
        Ok(StorageClient::new(
            self.service_client(Service::Storage, user_token).await?,
        ))
    }

    pub async fn partition_client(
        &self,
        user_token: Option<&str>,
    ) -> Result<PartitionClient, OsduError> {
        Ok(PartitionClient::new(
            self.service_client(Service::Partition, user_token).await?,
        ))
    }

    pub async fn entitlements_client(
        &self,
        user_token: Option<&str>,
    ) -> Result<EntitlementsClient, OsduError> {
        Ok(EntitlementsClient::new(
            self.service_client(Service::Entitlements, user_token).await?,
        ))
    }
}

pub fn server_version() -> String {
    format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("GIT_HASH"))
}
