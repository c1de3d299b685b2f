//! OSDU REST clients.
//!
//! [`OsduClient`] handles authentication headers, trace ids and status
//! mapping. [`ServiceClient`] binds it to one service's base path and owns the
//! write/delete permission gates. The typed clients (legal, schema, ...) add
//! service-specific conventions on top.

mod entitlements;
mod error;
mod legal;
mod partition;
mod rest;
mod schema;
mod service;
mod storage;
mod transport;

pub use entitlements::EntitlementsClient;
pub use error::OsduError;
pub use legal::{
    ensure_full_tag_name, simplify_tag_name, LegalClient, LegalTagSearch, LegalTagUpdate,
    MAX_BATCH_RETRIEVE,
};
pub use partition::{redact_sensitive, PartitionClient, REDACTED};
pub use rest::{
    OsduClient, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE, HEADER_CORRELATION_ID,
    HEADER_DATA_PARTITION,
};
pub use schema::{schema_info_matches, SchemaClient, SchemaFilter, SchemaIdentity, SchemaStatus};
pub use service::{Service, ServiceClient};
pub use storage::{
    validate_records, StorageClient, DEFAULT_QUERY_LIMIT, MAX_QUERY_LIMIT, MAX_RECORDS_PER_FETCH,
    MAX_RECORDS_PER_UPSERT, REQUIRED_RECORD_FIELDS,
};
pub use transport::{HttpTransport, OsduRequest, OsduResponse, ReqwestTransport};
