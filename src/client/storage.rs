//! Storage service client.

use serde_json::{json, Value};

use super::error::OsduError;
use super::service::{segment, ServiceClient};

pub const MAX_RECORDS_PER_UPSERT: usize = 500;
pub const MAX_RECORDS_PER_FETCH: usize = 100;
pub const MAX_QUERY_LIMIT: u32 = 1000;
pub const DEFAULT_QUERY_LIMIT: u32 = 10;

/// Top-level fields every record must carry on create/update.
pub const REQUIRED_RECORD_FIELDS: [&str; 4] = ["kind", "acl", "legal", "data"];

pub struct StorageClient {
    inner: ServiceClient,
}

impl StorageClient {
    pub fn new(inner: ServiceClient) -> Self {
        Self { inner }
    }

    pub fn data_partition(&self) -> &str {
        self.inner.data_partition()
    }

    /// Create or update records. Records are forwarded unchanged.
    pub async fn create_update_records(
        &self,
        records: Vec<Value>,
        skip_dupes: bool,
    ) -> Result<Value, OsduError> {
        validate_records(&records)?;
        self.inner.check_write_permission()?;

        let query = [("skipdupes", skip_dupes.to_string())];
        self.inner.put("/records", &query, Value::Array(records)).await
    }

    pub async fn get_record(
        &self,
        id: &str,
        attributes: &[String],
    ) -> Result<Value, OsduError> {
        self.inner
            .get(&format!("/records/{}", segment(id)), &attribute_query(attributes))
            .await
    }

    pub async fn get_record_version(
        &self,
        id: &str,
        version: u64,
        attributes: &[String],
    ) -> Result<Value, OsduError> {
        self.inner
            .get(
                &format!("/records/{}/{}", segment(id), version),
                &attribute_query(attributes),
            )
            .await
    }

    pub async fn list_record_versions(&self, id: &str) -> Result<Value, OsduError> {
        self.inner
            .get(&format!("/records/versions/{}", segment(id)), &[])
            .await
    }

    pub async fn query_records_by_kind(
        &self,
        kind: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<Value, OsduError> {
        if limit == 0 || limit > MAX_QUERY_LIMIT {
            return Err(OsduError::Validation(format!(
                "limit must be between 1 and {}",
                MAX_QUERY_LIMIT
            )));
        }
        let mut query = vec![("kind", kind.to_string()), ("limit", limit.to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        self.inner.get("/query/records", &query).await
    }

    pub async fn fetch_records(
        &self,
        ids: &[String],
        attributes: &[String],
    ) -> Result<Value, OsduError> {
        if ids.is_empty() {
            return Err(OsduError::Validation(
                "At least one record id is required".to_string(),
            ));
        }
        if ids.len() > MAX_RECORDS_PER_FETCH {
            return Err(OsduError::Validation(format!(
                "Too many records requested. Maximum {} records can be fetched at once",
                MAX_RECORDS_PER_FETCH
            )));
        }

        let mut body = json!({ "records": ids });
        if !attributes.is_empty() {
            body["attributes"] = json!(attributes);
        }
        self.inner.post("/query/records", body).await
    }

    /// Logical delete; the record can be restored by the platform.
    pub async fn delete_record(&self, id: &str) -> Result<(), OsduError> {
        self.inner.check_delete_permission()?;
        self.inner
            .post(&format!("/records/{}:delete", segment(id)), json!({}))
            .await?;
        Ok(())
    }

    /// Permanent removal of the record and all its versions.
    pub async fn purge_record(&self, id: &str) -> Result<(), OsduError> {
        self.inner.check_delete_permission()?;
        self.inner
            .delete(&format!("/records/{}", segment(id)))
            .await?;
        Ok(())
    }
}

fn attribute_query(attributes: &[String]) -> Vec<(&'static str, String)> {
    attributes
        .iter()
        .map(|attribute| ("attribute", attribute.clone()))
        .collect()
}

/// Reject empty batches, oversize batches, and records missing a required
/// top-level field.
pub fn validate_records(records: &[Value]) -> Result<(), OsduError> {
    if records.is_empty() {
        return Err(OsduError::Validation(
            "At least one record is required".to_string(),
        ));
    }
    if records.len() > MAX_RECORDS_PER_UPSERT {
        return Err(OsduError::Validation(format!(
            "Too many records. Maximum {} records can be created or updated at once",
            MAX_RECORDS_PER_UPSERT
        )));
    }

    for (index, record) in records.iter().enumerate() {
        let object = record.as_object().ok_or_else(|| {
            OsduError::Validation(format!("Record {} must be a JSON object", index))
        })?;
        let missing: Vec<&str> = REQUIRED_RECORD_FIELDS
            .iter()
            .copied()
            .filter(|field| !object.contains_key(*field))
            .collect();
        if !missing.is_empty() {
            return Err(OsduError::Validation(format!(
                "Record {} is missing required fields: {}",
                index,
                missing.join(", ")
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Value {
        json!({
            "kind": "osdu:wks:master-data--Well:1.0.0",
            "acl": {"viewers": ["v"], "owners": ["o"]},
            "legal": {"legaltags": ["opendes-foo"], "otherRelevantDataCountries": ["US"]},
            "data": {}
        })
    }

    #[test]
    fn test_validate_records_ok() {
        assert!(validate_records(&[record(), record()]).is_ok());
    }

    #[test]
    fn test_validate_records_missing_fields() {
        let mut bad = record();
        bad.as_object_mut().unwrap().remove("legal");
        let err = validate_records(&[record(), bad]).unwrap_err();
        assert!(err.to_string().contains("Record 1"));
        assert!(err.to_string().contains("legal"));
    }

    #[test]
    fn test_validate_records_limits() {
        assert!(validate_records(&[]).is_err());
        let many = vec![record(); MAX_RECORDS_PER_UPSERT + 1];
        assert!(matches!(
            validate_records(&many),
            Err(OsduError::Validation(_))
        ));
    }

    #[test]
    fn test_attribute_query_repeats_key() {
        let query = attribute_query(&["data.A".to_string(), "data.B".to_string()]);
        assert_eq!(
            query,
            vec![
                ("attribute", "data.A".to_string()),
                ("attribute", "data.B".to_string())
            ]
        );
    }
}
