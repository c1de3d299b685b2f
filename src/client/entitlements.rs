use serde_json::Value;

use super::error::OsduError;
use super::service::ServiceClient;

pub struct EntitlementsClient {
    inner: ServiceClient,
}

impl EntitlementsClient {
    pub fn new(inner: ServiceClient) -> Self {
        Self { inner }
    }

    pub fn data_partition(&self) -> &str {
        self.inner.data_partition()
    }

    /// Groups the authenticated caller belongs to.
    pub async fn my_groups(&self) -> Result<Value, OsduError> {
        self.inner.get("/groups", &[]).await
    }
}
