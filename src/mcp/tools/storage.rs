//! Storage Tools
//!
//! Records are forwarded to the storage service exactly as given; `acl`,
//! `legal`, `data` and `kind` are never rewritten.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{array_field, parse_params, require_confirmation, success, user_token_schema};
use crate::client::{
    DEFAULT_QUERY_LIMIT, MAX_QUERY_LIMIT, MAX_RECORDS_PER_FETCH, MAX_RECORDS_PER_UPSERT,
};
use crate::mcp::context::ToolContext;
use crate::mcp::registry::{McpRegistry, RegisteredTool, ToolBuilder, ToolCategory, ToolResult};

pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(create_update_records_tool());
    registry.register_tool(get_record_tool());
    registry.register_tool(get_record_version_tool());
    registry.register_tool(list_record_versions_tool());
    registry.register_tool(query_records_by_kind_tool());
    registry.register_tool(fetch_records_tool());
    registry.register_tool(delete_record_tool());
    registry.register_tool(purge_record_tool());
}

fn attributes_schema() -> Value {
    json!({
        "type": "array",
        "items": {"type": "string"},
        "description": "Only return these data fields, e.g. [\"data.FacilityName\"]"
    })
}

// ============================================================================
// storage_create_update_records
// ============================================================================

#[derive(Debug, Deserialize)]
struct UpsertParams {
    records: Vec<Value>,
    #[serde(default)]
    skip_dupes: bool,
}

fn create_update_records_tool() -> RegisteredTool {
    ToolBuilder::new("storage_create_update_records")
        .description(format!(
            "Create or update up to {} records. Each record needs kind, acl, legal and data. \
             Requires OSDU_MCP_ENABLE_WRITE_MODE=true",
            MAX_RECORDS_PER_UPSERT
        ))
        .input_schema(json!({
            "type": "object",
            "properties": {
                "records": {
                    "type": "array",
                    "items": {"type": "object"},
                    "minItems": 1,
                    "maxItems": MAX_RECORDS_PER_UPSERT
                },
                "skip_dupes": {
                    "type": "boolean",
                    "default": false,
                    "description": "Skip records whose content is unchanged"
                }
            },
            "required": ["records"]
        }))
        .category(ToolCategory::Write)
        .build(create_update_records_handler)
}

async fn create_update_records_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: UpsertParams = parse_params(params)?;
    let count = params.records.len();
    let client = ctx.storage_client(None).await?;

    let response = client
        .create_update_records(params.records, params.skip_dupes)
        .await?;
    let record_ids = array_field(&response, "recordIds");
    let skipped = array_field(&response, "skippedRecordIds");

    info!(
        target: "audit",
        operation = "create_update_records",
        submitted = count,
        stored = record_ids.len(),
        partition = %ctx.data_partition(),
        "Records created or updated"
    );
    success(
        &ctx,
        json!({
            "recordCount": response.get("recordCount").cloned().unwrap_or(json!(record_ids.len())),
            "recordIds": record_ids,
            "skippedRecordIds": skipped,
            "recordIdVersions": array_field(&response, "recordIdVersions"),
            "write_enabled": true
        }),
    )
}

// ============================================================================
// storage_get_record
// ============================================================================

#[derive(Debug, Deserialize)]
struct GetRecordParams {
    id: String,
    #[serde(default)]
    attributes: Vec<String>,
    #[serde(default)]
    user_token: Option<String>,
}

fn get_record_tool() -> RegisteredTool {
    ToolBuilder::new("storage_get_record")
        .description("Get the latest version of a record by id")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "id": {"type": "string"},
                "attributes": attributes_schema(),
                "user_token": user_token_schema()
            },
            "required": ["id"]
        }))
        .category(ToolCategory::Read)
        .build(get_record_handler)
}

async fn get_record_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: GetRecordParams = parse_params(params)?;
    let client = ctx.storage_client(params.user_token.as_deref()).await?;

    let record = client.get_record(&params.id, &params.attributes).await?;

    info!(
        record_id = %params.id,
        has_attributes = !params.attributes.is_empty(),
        "Retrieved record"
    );
    success(&ctx, json!({ "record": record }))
}

// ============================================================================
// storage_get_record_version
// ============================================================================

#[derive(Debug, Deserialize)]
struct GetVersionParams {
    id: String,
    version: u64,
    #[serde(default)]
    attributes: Vec<String>,
    #[serde(default)]
    user_token: Option<String>,
}

fn get_record_version_tool() -> RegisteredTool {
    ToolBuilder::new("storage_get_record_version")
        .description("Get a specific version of a record")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "id": {"type": "string"},
                "version": {"type": "integer", "minimum": 1},
                "attributes": attributes_schema(),
                "user_token": user_token_schema()
            },
            "required": ["id", "version"]
        }))
        .category(ToolCategory::Read)
        .build(get_record_version_handler)
}

async fn get_record_version_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: GetVersionParams = parse_params(params)?;
    let client = ctx.storage_client(params.user_token.as_deref()).await?;

    let record = client
        .get_record_version(&params.id, params.version, &params.attributes)
        .await?;

    info!(record_id = %params.id, version = params.version, "Retrieved record version");
    success(
        &ctx,
        json!({ "record": record, "version": params.version }),
    )
}

// ============================================================================
// storage_list_record_versions
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListVersionsParams {
    id: String,
    #[serde(default)]
    user_token: Option<String>,
}

fn list_record_versions_tool() -> RegisteredTool {
    ToolBuilder::new("storage_list_record_versions")
        .description("List all version numbers of a record")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "id": {"type": "string"},
                "user_token": user_token_schema()
            },
            "required": ["id"]
        }))
        .category(ToolCategory::Read)
        .build(list_record_versions_handler)
}

async fn list_record_versions_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: ListVersionsParams = parse_params(params)?;
    let client = ctx.storage_client(params.user_token.as_deref()).await?;

    let response = client.list_record_versions(&params.id).await?;
    let versions = array_field(&response, "versions");

    info!(record_id = %params.id, count = versions.len(), "Listed record versions");
    success(
        &ctx,
        json!({
            "recordId": response.get("recordId").cloned().unwrap_or(json!(params.id)),
            "versions": versions,
            "count": versions.len()
        }),
    )
}

// ============================================================================
// storage_query_records_by_kind
// ============================================================================

#[derive(Debug, Deserialize)]
struct QueryByKindParams {
    kind: String,
    #[serde(default = "default_query_limit")]
    limit: u32,
    #[serde(default)]
    cursor: Option<String>,
    #[serde(default)]
    user_token: Option<String>,
}

fn default_query_limit() -> u32 {
    DEFAULT_QUERY_LIMIT
}

fn query_records_by_kind_tool() -> RegisteredTool {
    ToolBuilder::new("storage_query_records_by_kind")
        .description("List record ids of a kind, page by page using the returned cursor")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "kind": {"type": "string", "description": "e.g. osdu:wks:master-data--Well:1.0.0"},
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_QUERY_LIMIT,
                    "default": DEFAULT_QUERY_LIMIT
                },
                "cursor": {"type": "string"},
                "user_token": user_token_schema()
            },
            "required": ["kind"]
        }))
        .category(ToolCategory::Read)
        .build(query_records_by_kind_handler)
}

async fn query_records_by_kind_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: QueryByKindParams = parse_params(params)?;
    let client = ctx.storage_client(params.user_token.as_deref()).await?;

    let response = client
        .query_records_by_kind(&params.kind, params.limit, params.cursor.as_deref())
        .await?;
    let records = array_field(&response, "results");

    info!(kind = %params.kind, count = records.len(), "Queried records by kind");
    success(
        &ctx,
        json!({
            "kind": params.kind,
            "count": records.len(),
            "records": records,
            "cursor": response.get("cursor").cloned().unwrap_or(Value::Null)
        }),
    )
}

// ============================================================================
// storage_fetch_records
// ============================================================================

#[derive(Debug, Deserialize)]
struct FetchParams {
    record_ids: Vec<String>,
    #[serde(default)]
    attributes: Vec<String>,
    #[serde(default)]
    user_token: Option<String>,
}

fn fetch_records_tool() -> RegisteredTool {
    ToolBuilder::new("storage_fetch_records")
        .description(format!(
            "Fetch up to {} records by id in one call",
            MAX_RECORDS_PER_FETCH
        ))
        .input_schema(json!({
            "type": "object",
            "properties": {
                "record_ids": {
                    "type": "array",
                    "items": {"type": "string"},
                    "minItems": 1,
                    "maxItems": MAX_RECORDS_PER_FETCH
                },
                "attributes": attributes_schema(),
                "user_token": user_token_schema()
            },
            "required": ["record_ids"]
        }))
        .category(ToolCategory::Read)
        .build(fetch_records_handler)
}

async fn fetch_records_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: FetchParams = parse_params(params)?;
    let client = ctx.storage_client(params.user_token.as_deref()).await?;

    let response = client
        .fetch_records(&params.record_ids, &params.attributes)
        .await?;
    let records = array_field(&response, "records");
    let invalid = array_field(&response, "invalidRecords");
    let retry = array_field(&response, "retryRecords");

    info!(
        requested = params.record_ids.len(),
        found = records.len(),
        "Fetched records"
    );
    success(
        &ctx,
        json!({
            "count": records.len(),
            "records": records,
            "invalidRecords": invalid,
            "retryRecords": retry
        }),
    )
}

// ============================================================================
// storage_delete_record / storage_purge_record
// ============================================================================

#[derive(Debug, Deserialize)]
struct DeleteParams {
    id: String,
    #[serde(default)]
    confirm: bool,
}

fn delete_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": {"type": "string"},
            "confirm": {"type": "boolean", "description": "Must be true"}
        },
        "required": ["id", "confirm"]
    })
}

fn delete_record_tool() -> RegisteredTool {
    ToolBuilder::new("storage_delete_record")
        .description(
            "Logically delete a record; it can be restored. \
             Requires confirm=true and OSDU_MCP_ENABLE_DELETE_MODE=true",
        )
        .input_schema(delete_schema())
        .category(ToolCategory::Delete)
        .build(delete_record_handler)
}

async fn delete_record_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: DeleteParams = parse_params(params)?;
    require_confirmation(
        params.confirm,
        "Deletion not confirmed. Set confirm=true to delete the record.",
    )?;

    let client = ctx.storage_client(None).await?;
    client.delete_record(&params.id).await?;

    info!(
        target: "audit",
        operation = "delete_record",
        record_id = %params.id,
        partition = %ctx.data_partition(),
        "Record deleted"
    );
    success(
        &ctx,
        json!({ "id": params.id, "deleted": true, "delete_enabled": true }),
    )
}

fn purge_record_tool() -> RegisteredTool {
    ToolBuilder::new("storage_purge_record")
        .description(
            "Permanently remove a record and all of its versions. This cannot be undone. \
             Requires confirm=true and OSDU_MCP_ENABLE_DELETE_MODE=true",
        )
        .input_schema(delete_schema())
        .category(ToolCategory::Delete)
        .build(purge_record_handler)
}

async fn purge_record_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: DeleteParams = parse_params(params)?;
    require_confirmation(
        params.confirm,
        "Purge not confirmed. Set confirm=true to permanently purge the record. \
         WARNING: This cannot be undone.",
    )?;

    let client = ctx.storage_client(None).await?;
    client.purge_record(&params.id).await?;

    info!(
        target: "audit",
        operation = "purge_record",
        record_id = %params.id,
        partition = %ctx.data_partition(),
        "Record purged"
    );
    success(
        &ctx,
        json!({
            "id": params.id,
            "purged": true,
            "delete_enabled": true,
            "warning": "Record and all versions permanently removed"
        }),
    )
}
