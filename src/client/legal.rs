//! Legal service client.
//!
//! Tag names come in two forms: simple (`public-usa`) and full, prefixed with
//! the data partition (`opendes-public-usa`). This client is the only place
//! that converts between them.

use serde_json::{json, Map, Value};

use super::error::OsduError;
use super::service::{segment, ServiceClient};

/// Maximum number of tags accepted by a single batch retrieval.
pub const MAX_BATCH_RETRIEVE: usize = 25;

/// Full tag name: `{partition}-{name}`, unless already prefixed.
pub fn ensure_full_tag_name(partition: &str, name: &str) -> String {
    let prefix = format!("{}-", partition);
    if name.starts_with(&prefix) {
        name.to_string()
    } else {
        format!("{}{}", prefix, name)
    }
}

/// Simple tag name with one leading `{partition}-` removed.
pub fn simplify_tag_name(partition: &str, name: &str) -> String {
    let prefix = format!("{}-", partition);
    name.strip_prefix(&prefix).unwrap_or(name).to_string()
}

/// Optional fields of a tag update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct LegalTagUpdate {
    pub description: Option<String>,
    pub contract_id: Option<String>,
    pub expiration_date: Option<String>,
    pub extension_properties: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct LegalTagSearch {
    pub query: Option<Vec<String>>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub limit: Option<u32>,
}

pub struct LegalClient {
    inner: ServiceClient,
}

impl LegalClient {
    pub fn new(inner: ServiceClient) -> Self {
        Self { inner }
    }

    pub fn data_partition(&self) -> &str {
        self.inner.data_partition()
    }

    pub fn full_name(&self, name: &str) -> String {
        ensure_full_tag_name(self.data_partition(), name)
    }

    pub fn simple_name(&self, name: &str) -> String {
        simplify_tag_name(self.data_partition(), name)
    }

    pub async fn list_legal_tags(&self, valid: Option<bool>) -> Result<Value, OsduError> {
        let mut query = Vec::new();
        if let Some(valid) = valid {
            query.push(("valid", valid.to_string()));
        }
        self.inner.get("/legaltags", &query).await
    }

    pub async fn get_legal_tag(&self, name: &str) -> Result<Value, OsduError> {
        let path = format!("/legaltags/{}", segment(&self.full_name(name)));
        self.inner.get(&path, &[]).await
    }

    pub async fn get_legal_tag_properties(&self) -> Result<Value, OsduError> {
        self.inner.get("/legaltags:properties", &[]).await
    }

    pub async fn search_legal_tags(&self, search: &LegalTagSearch) -> Result<Value, OsduError> {
        let mut body = Map::new();
        if let Some(query) = search.query.as_ref().filter(|q| !q.is_empty()) {
            body.insert("queryList".to_string(), json!(query));
        }
        if let Some(sort_by) = &search.sort_by {
            body.insert("sortBy".to_string(), json!(sort_by));
        }
        if let Some(sort_order) = &search.sort_order {
            body.insert("sortOrder".to_string(), json!(sort_order));
        }
        if let Some(limit) = search.limit.filter(|l| *l > 0) {
            body.insert("limit".to_string(), json!(limit));
        }
        self.inner
            .post("/legaltags:query", Value::Object(body))
            .await
    }

    /// Retrieve up to [`MAX_BATCH_RETRIEVE`] tags. Larger batches are
    /// rejected without contacting the service.
    pub async fn batch_retrieve_legal_tags(&self, names: &[String]) -> Result<Value, OsduError> {
        if names.len() > MAX_BATCH_RETRIEVE {
            return Err(OsduError::Validation(format!(
                "Too many legal tags requested. Maximum {} legal tags can be retrieved at once",
                MAX_BATCH_RETRIEVE
            )));
        }
        let full_names: Vec<String> = names.iter().map(|n| self.full_name(n)).collect();
        self.inner
            .post("/legaltags:batchRetrieve", json!({ "names": full_names }))
            .await
    }

    /// The service expects the simple name on creation; the partition is
    /// implied by the request's `data-partition-id`.
    pub async fn create_legal_tag(
        &self,
        name: &str,
        description: &str,
        properties: Value,
    ) -> Result<Value, OsduError> {
        self.inner.check_write_permission()?;
        let body = json!({
            "name": self.simple_name(name),
            "description": description,
            "properties": properties,
        });
        self.inner.post("/legaltags", body).await
    }

    pub async fn update_legal_tag(
        &self,
        name: &str,
        update: LegalTagUpdate,
    ) -> Result<Value, OsduError> {
        self.inner.check_write_permission()?;

        let mut body = Map::new();
        body.insert("name".to_string(), json!(self.full_name(name)));
        if let Some(description) = update.description {
            body.insert("description".to_string(), json!(description));
        }
        if let Some(contract_id) = update.contract_id {
            body.insert("contractId".to_string(), json!(contract_id));
        }
        if let Some(expiration_date) = update.expiration_date {
            body.insert("expirationDate".to_string(), json!(expiration_date));
        }
        if let Some(extension_properties) = update.extension_properties {
            body.insert("extensionProperties".to_string(), extension_properties);
        }
        self.inner.put("/legaltags", &[], Value::Object(body)).await
    }

    pub async fn delete_legal_tag(&self, name: &str) -> Result<(), OsduError> {
        self.inner.check_delete_permission()?;
        let path = format!("/legaltags/{}", segment(&self.full_name(name)));
        self.inner.delete(&path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_full_tag_name() {
        assert_eq!(ensure_full_tag_name("opendes", "foo"), "opendes-foo");
        assert_eq!(ensure_full_tag_name("opendes", "opendes-foo"), "opendes-foo");
    }

    #[test]
    fn test_ensure_full_tag_name_is_idempotent() {
        for name in ["foo", "opendes-foo", "opendes-opendes-foo", "", "opendes", "other-foo"] {
            let once = ensure_full_tag_name("opendes", name);
            assert_eq!(ensure_full_tag_name("opendes", &once), once, "name: {:?}", name);
        }
    }

    #[test]
    fn test_simplify_tag_name() {
        assert_eq!(simplify_tag_name("opendes", "opendes-foo"), "foo");
        assert_eq!(simplify_tag_name("opendes", "foo"), "foo");
        // only one prefix is removed
        assert_eq!(
            simplify_tag_name("opendes", "opendes-opendes-foo"),
            "opendes-foo"
        );
    }

    #[test]
    fn test_simplify_after_ensure_matches_simplify() {
        for name in ["foo", "opendes-foo", "opendes-opendes-foo", "x-opendes-foo"] {
            assert_eq!(
                simplify_tag_name("opendes", &ensure_full_tag_name("opendes", name)),
                simplify_tag_name("opendes", name),
                "name: {:?}",
                name
            );
        }
    }

    #[test]
    fn test_partition_with_regex_characters() {
        // partition ids are matched literally
        assert_eq!(ensure_full_tag_name("a.b", "axb-foo"), "a.b-axb-foo");
        assert_eq!(simplify_tag_name("a.b", "axb-foo"), "axb-foo");
    }
}
