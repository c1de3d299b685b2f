use serde_json::{json, Map, Value};

use super::error::OsduError;
use super::service::{segment, ServiceClient};

pub const REDACTED: &str = "<REDACTED>";

pub struct PartitionClient {
    inner: ServiceClient,
}

impl PartitionClient {
    pub fn new(inner: ServiceClient) -> Self {
        Self { inner }
    }

    pub fn data_partition(&self) -> &str {
        self.inner.data_partition()
    }

    pub async fn list_partitions(&self) -> Result<Value, OsduError> {
        self.inner.get("/partitions", &[]).await
    }

    pub async fn get_partition(&self, partition_id: &str) -> Result<Value, OsduError> {
        self.inner
            .get(&format!("/partitions/{}", segment(partition_id)), &[])
            .await
    }

    pub async fn create_partition(
        &self,
        partition_id: &str,
        properties: Value,
    ) -> Result<Value, OsduError> {
        self.inner.check_write_permission()?;
        self.inner
            .post(
                &format!("/partitions/{}", segment(partition_id)),
                json!({ "properties": properties }),
            )
            .await
    }

    pub async fn update_partition(
        &self,
        partition_id: &str,
        properties: Value,
    ) -> Result<Value, OsduError> {
        self.inner.check_write_permission()?;
        self.inner
            .patch(
                &format!("/partitions/{}", segment(partition_id)),
                json!({ "properties": properties }),
            )
            .await
    }

    pub async fn delete_partition(&self, partition_id: &str) -> Result<(), OsduError> {
        self.inner.check_delete_permission()?;
        self.inner
            .delete(&format!("/partitions/{}", segment(partition_id)))
            .await?;
        Ok(())
    }
}

/// Replace the value of every property flagged `"sensitive": true`.
///
/// Returns the number of redacted properties.
pub fn redact_sensitive(properties: &mut Map<String, Value>) -> usize {
    let mut redacted = 0;
    for property in properties.values_mut() {
        let Some(object) = property.as_object_mut() else {
            continue;
        };
        if object.get("sensitive").and_then(Value::as_bool) == Some(true) {
            object.insert("value".to_string(), json!(REDACTED));
            redacted += 1;
        }
    }
    redacted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_sensitive() {
        let mut properties = json!({
            "compliance-ruleset": {"sensitive": false, "value": "shared"},
            "storage-account-key": {"sensitive": true, "value": "s3cr3t"},
            "plain": "x"
        });
        let map = properties.as_object_mut().unwrap();
        assert_eq!(redact_sensitive(map), 1);
        assert_eq!(properties["storage-account-key"]["value"], REDACTED);
        assert_eq!(properties["compliance-ruleset"]["value"], "shared");
        assert_eq!(properties["plain"], "x");
    }
}
