//! Per-service path prefixing and permission gates.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::error::OsduError;
use super::rest::OsduClient;
use crate::config::{EnvSource, PermissionFlags, ENV_ENABLE_DELETE_MODE, ENV_ENABLE_WRITE_MODE};

/// OSDU services fronted by this server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Legal,
    Schema,
    Storage,
    Partition,
    Entitlements,
}

impl Service {
    pub const ALL: [Service; 5] = [
        Service::Legal,
        Service::Schema,
        Service::Storage,
        Service::Partition,
        Service::Entitlements,
    ];

    pub fn base_path(&self) -> &'static str {
        match self {
            Service::Legal => "/api/legal/v1",
            Service::Schema => "/api/schema-service/v1",
            Service::Storage => "/api/storage/v2",
            Service::Partition => "/api/partition/v1",
            Service::Entitlements => "/api/entitlements/v2",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Service::Legal => "legal",
            Service::Schema => "schema",
            Service::Storage => "storage",
            Service::Partition => "partition",
            Service::Entitlements => "entitlements",
        }
    }

    fn write_subject(&self) -> &'static str {
        match self {
            Service::Legal => "Legal tag",
            Service::Schema => "Schema",
            Service::Storage => "Storage",
            Service::Partition => "Partition",
            Service::Entitlements => "Entitlements",
        }
    }

    fn delete_subject(&self) -> &'static str {
        match self {
            Service::Legal => "legal tag deletion",
            Service::Schema => "schema deletion",
            Service::Storage => "record deletion",
            Service::Partition => "partition deletion",
            Service::Entitlements => "group deletion",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// [`OsduClient`] bound to one service's base path.
///
/// Dropping the client releases its reference to the auth handler; for a
/// per-call handler (caller-supplied token) that closes it.
pub struct ServiceClient {
    service: Service,
    rest: OsduClient,
    env: Arc<dyn EnvSource>,
}

impl ServiceClient {
    pub fn new(service: Service, rest: OsduClient, env: Arc<dyn EnvSource>) -> Self {
        Self { service, rest, env }
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn data_partition(&self) -> &str {
        self.rest.data_partition()
    }

    pub fn rest(&self) -> &OsduClient {
        &self.rest
    }

    fn path(&self, path: &str) -> String {
        format!("{}{}", self.service.base_path(), path)
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, OsduError> {
        self.rest.get(&self.path(path), query).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value, OsduError> {
        self.rest.post(&self.path(path), body).await
    }

    pub async fn put(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: Value,
    ) -> Result<Value, OsduError> {
        self.rest.put(&self.path(path), query, body).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<Value, OsduError> {
        self.rest.patch(&self.path(path), body).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, OsduError> {
        self.rest.delete(&self.path(path)).await
    }

    /// Fail unless write mode is enabled. Flags are read on every call.
    pub fn check_write_permission(&self) -> Result<(), OsduError> {
        if PermissionFlags::read(self.env.as_ref()).write_enabled {
            return Ok(());
        }
        Err(OsduError::PermissionDenied(format!(
            "{} write operations are disabled. Set {}=true to enable write operations",
            self.service.write_subject(),
            ENV_ENABLE_WRITE_MODE
        )))
    }

    /// Fail unless delete mode is enabled. Flags are read on every call.
    pub fn check_delete_permission(&self) -> Result<(), OsduError> {
        if PermissionFlags::read(self.env.as_ref()).delete_enabled {
            return Ok(());
        }
        Err(OsduError::PermissionDenied(format!(
            "Delete operations are disabled. Set {}=true to enable {}",
            ENV_ENABLE_DELETE_MODE,
            self.service.delete_subject()
        )))
    }
}

/// Encode one path segment.
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
