use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};

use super::error::OsduError;
use super::service::{segment, ServiceClient};

/// Lifecycle status of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStatus {
    Development,
    Published,
    Obsolete,
}

impl SchemaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaStatus::Development => "DEVELOPMENT",
            SchemaStatus::Published => "PUBLISHED",
            SchemaStatus::Obsolete => "OBSOLETE",
        }
    }
}

impl FromStr for SchemaStatus {
    type Err = OsduError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEVELOPMENT" => Ok(SchemaStatus::Development),
            "PUBLISHED" => Ok(SchemaStatus::Published),
            "OBSOLETE" => Ok(SchemaStatus::Obsolete),
            other => Err(OsduError::Validation(format!(
                "Invalid schema status '{}'. Expected DEVELOPMENT, PUBLISHED or OBSOLETE",
                other
            ))),
        }
    }
}

impl fmt::Display for SchemaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `authority:source:entityType:major.minor.patch`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIdentity {
    pub authority: String,
    pub source: String,
    pub entity_type: String,
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SchemaIdentity {
    pub fn id(&self) -> String {
        format!(
            "{}:{}:{}:{}.{}.{}",
            self.authority, self.source, self.entity_type, self.major, self.minor, self.patch
        )
    }

    pub fn parse(id: &str) -> Result<Self, OsduError> {
        let invalid = || {
            OsduError::Validation(format!(
                "Invalid schema id '{}'. Expected authority:source:entityType:major.minor.patch",
                id
            ))
        };

        let parts: Vec<&str> = id.split(':').collect();
        if parts.len() != 4 || parts[..3].iter().any(|p| p.is_empty()) {
            return Err(invalid());
        }
        let version: Vec<u32> = parts[3]
            .split('.')
            .map(|v| v.parse::<u32>())
            .collect::<Result<_, _>>()
            .map_err(|_| invalid())?;
        if version.len() != 3 {
            return Err(invalid());
        }

        Ok(Self {
            authority: parts[0].to_string(),
            source: parts[1].to_string(),
            entity_type: parts[2].to_string(),
            major: version[0],
            minor: version[1],
            patch: version[2],
        })
    }

    fn to_json(&self) -> Value {
        json!({
            "authority": self.authority,
            "source": self.source,
            "entityType": self.entity_type,
            "schemaVersionMajor": self.major,
            "schemaVersionMinor": self.minor,
            "schemaVersionPatch": self.patch,
            "id": self.id(),
        })
    }
}

/// Query filters for schema listing.
#[derive(Debug, Clone, Default)]
pub struct SchemaFilter {
    pub authority: Option<String>,
    pub source: Option<String>,
    pub entity_type: Option<String>,
    pub status: Option<String>,
    pub scope: Option<String>,
    pub latest_version: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl SchemaFilter {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        let strings = [
            ("authority", &self.authority),
            ("source", &self.source),
            ("entityType", &self.entity_type),
            ("status", &self.status),
            ("scope", &self.scope),
        ];
        for (key, value) in strings {
            if let Some(value) = value {
                query.push((key, value.clone()));
            }
        }
        if let Some(latest) = self.latest_version {
            query.push(("latestVersion", latest.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            query.push(("offset", offset.to_string()));
        }
        query
    }
}

pub struct SchemaClient {
    inner: ServiceClient,
}

impl SchemaClient {
    pub fn new(inner: ServiceClient) -> Self {
        Self { inner }
    }

    pub fn data_partition(&self) -> &str {
        self.inner.data_partition()
    }

    pub async fn list_schemas(&self, filter: &SchemaFilter) -> Result<Value, OsduError> {
        self.inner.get("/schema", &filter.to_query()).await
    }

    pub async fn get_schema(&self, id: &str) -> Result<Value, OsduError> {
        self.inner
            .get(&format!("/schema/{}", segment(id)), &[])
            .await
    }

    pub async fn create_schema(
        &self,
        identity: &SchemaIdentity,
        schema: Value,
        status: SchemaStatus,
    ) -> Result<Value, OsduError> {
        self.inner.check_write_permission()?;
        self.inner
            .post("/schema", schema_body(identity, schema, status))
            .await
    }

    pub async fn update_schema(
        &self,
        identity: &SchemaIdentity,
        schema: Value,
        status: SchemaStatus,
    ) -> Result<Value, OsduError> {
        self.inner.check_write_permission()?;
        self.inner
            .put("/schema", &[], schema_body(identity, schema, status))
            .await
    }
}

fn schema_body(identity: &SchemaIdentity, schema: Value, status: SchemaStatus) -> Value {
    json!({
        "schemaInfo": {
            "schemaIdentity": identity.to_json(),
            "status": status.as_str(),
        },
        "schema": schema,
    })
}

/// True if `text` occurs (case-insensitively) in the schema's identity fields.
pub fn schema_info_matches(info: &Value, text: &str) -> bool {
    let needle = text.to_lowercase();
    let identity = &info["schemaIdentity"];
    ["id", "authority", "source", "entityType"]
        .iter()
        .filter_map(|key| identity[*key].as_str())
        .any(|value| value.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identity() {
        let identity = SchemaIdentity::parse("osdu:wks:master-data--Well:1.2.3").unwrap();
        assert_eq!(identity.authority, "osdu");
        assert_eq!(identity.entity_type, "master-data--Well");
        assert_eq!((identity.major, identity.minor, identity.patch), (1, 2, 3));
        assert_eq!(identity.id(), "osdu:wks:master-data--Well:1.2.3");
    }

    #[test]
    fn test_parse_identity_rejects_malformed() {
        for id in ["osdu:wks:Well", "osdu:wks:Well:1.0", "osdu::Well:1.0.0", "a:b:c:1.x.0"] {
            assert!(
                matches!(SchemaIdentity::parse(id), Err(OsduError::Validation(_))),
                "id: {}",
                id
            );
        }
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(
            "published".parse::<SchemaStatus>().unwrap(),
            SchemaStatus::Published
        );
        assert!("FINAL".parse::<SchemaStatus>().is_err());
    }

    #[test]
    fn test_filter_query() {
        let filter = SchemaFilter {
            authority: Some("osdu".to_string()),
            latest_version: Some(true),
            limit: Some(10),
            ..Default::default()
        };
        let query = filter.to_query();
        assert!(query.contains(&("authority", "osdu".to_string())));
        assert!(query.contains(&("latestVersion", "true".to_string())));
        assert!(query.contains(&("limit", "10".to_string())));
        assert_eq!(query.len(), 3);
    }

    #[test]
    fn test_schema_info_matches() {
        let info = json!({
            "schemaIdentity": {
                "id": "osdu:wks:master-data--Wellbore:1.0.0",
                "authority": "osdu",
                "source": "wks",
                "entityType": "master-data--Wellbore"
            }
        });
        assert!(schema_info_matches(&info, "wellbore"));
        assert!(!schema_info_matches(&info, "seismic"));
    }
}
