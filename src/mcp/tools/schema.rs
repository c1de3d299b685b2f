//! Schema Tools

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{array_field, parse_params, success, user_token_schema};
use crate::client::{schema_info_matches, OsduError, SchemaFilter, SchemaIdentity, SchemaStatus};
use crate::mcp::context::ToolContext;
use crate::mcp::registry::{McpRegistry, RegisteredTool, ToolBuilder, ToolCategory, ToolResult};

pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(schema_list_tool());
    registry.register_tool(schema_get_tool());
    registry.register_tool(schema_search_tool());
    registry.register_tool(schema_create_tool());
    registry.register_tool(schema_update_tool());
}

const DEFAULT_LIST_LIMIT: u32 = 100;
const DEFAULT_SEARCH_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
struct FilterParams {
    #[serde(default)]
    authority: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    entity: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    latest_version: Option<bool>,
}

impl FilterParams {
    fn into_filter(self, limit: u32, offset: Option<u32>) -> Result<SchemaFilter, OsduError> {
        let status = match self.status {
            Some(status) => Some(status.parse::<SchemaStatus>()?.as_str().to_string()),
            None => None,
        };
        Ok(SchemaFilter {
            authority: self.authority,
            source: self.source,
            entity_type: self.entity,
            status,
            scope: self.scope,
            latest_version: self.latest_version,
            limit: Some(limit),
            offset,
        })
    }
}

fn filter_properties() -> serde_json::Map<String, Value> {
    let schema = json!({
        "authority": {"type": "string", "description": "e.g. osdu"},
        "source": {"type": "string", "description": "e.g. wks"},
        "entity": {"type": "string", "description": "Entity type, e.g. master-data--Well"},
        "status": {"type": "string", "enum": ["DEVELOPMENT", "PUBLISHED", "OBSOLETE"]},
        "scope": {"type": "string", "enum": ["INTERNAL", "SHARED"]},
        "latest_version": {"type": "boolean"},
        "user_token": user_token_schema()
    });
    match schema {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

// ============================================================================
// schema_list
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListParams {
    #[serde(flatten)]
    filter: FilterParams,
    #[serde(default)]
    limit: Option<u32>,
    #[serde(default)]
    offset: Option<u32>,
    #[serde(default)]
    user_token: Option<String>,
}

fn schema_list_tool() -> RegisteredTool {
    let mut properties = filter_properties();
    properties.insert("limit".to_string(), json!({"type": "integer", "minimum": 1}));
    properties.insert("offset".to_string(), json!({"type": "integer", "minimum": 0}));

    ToolBuilder::new("schema_list")
        .description("List schemas, optionally filtered by authority, source, entity type, status or scope")
        .input_schema(json!({ "type": "object", "properties": properties }))
        .category(ToolCategory::Read)
        .build(schema_list_handler)
}

async fn schema_list_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: ListParams = parse_params(params)?;
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let filter = params.filter.into_filter(limit, params.offset)?;
    let client = ctx.schema_client(params.user_token.as_deref()).await?;

    let response = client.list_schemas(&filter).await?;
    let schemas = array_field(&response, "schemaInfos");

    info!(count = schemas.len(), "Listed schemas");
    success(
        &ctx,
        json!({
            "count": schemas.len(),
            "schemas": schemas,
            "offset": response.get("offset").cloned().unwrap_or(json!(params.offset.unwrap_or(0))),
            "totalCount": response.get("totalCount").cloned().unwrap_or(Value::Null),
        }),
    )
}

// ============================================================================
// schema_get
// ============================================================================

#[derive(Debug, Deserialize)]
struct GetParams {
    id: String,
    #[serde(default)]
    user_token: Option<String>,
}

fn schema_get_tool() -> RegisteredTool {
    ToolBuilder::new("schema_get")
        .description("Get a schema by id (authority:source:entityType:major.minor.patch)")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "id": {"type": "string"},
                "user_token": user_token_schema()
            },
            "required": ["id"]
        }))
        .category(ToolCategory::Read)
        .build(schema_get_handler)
}

async fn schema_get_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: GetParams = parse_params(params)?;
    let client = ctx.schema_client(params.user_token.as_deref()).await?;

    let schema = client.get_schema(&params.id).await?;

    info!(schema_id = %params.id, "Retrieved schema");
    success(&ctx, json!({ "id": params.id, "schema": schema }))
}

// ============================================================================
// schema_search
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchParams {
    text: String,
    #[serde(flatten)]
    filter: FilterParams,
    #[serde(default)]
    limit: Option<u32>,
    #[serde(default)]
    user_token: Option<String>,
}

fn schema_search_tool() -> RegisteredTool {
    let mut properties = filter_properties();
    properties.insert(
        "text".to_string(),
        json!({"type": "string", "description": "Case-insensitive text matched against schema ids and identity fields"}),
    );
    properties.insert("limit".to_string(), json!({"type": "integer", "minimum": 1}));

    ToolBuilder::new("schema_search")
        .description("Find schemas whose id, authority, source or entity type contains the given text")
        .input_schema(json!({
            "type": "object",
            "properties": properties,
            "required": ["text"]
        }))
        .category(ToolCategory::Read)
        .build(schema_search_handler)
}

async fn schema_search_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: SearchParams = parse_params(params)?;
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).max(1) as usize;
    // Server-side filters narrow the candidates; text matching is local.
    let filter = params.filter.into_filter(1000, None)?;
    let client = ctx.schema_client(params.user_token.as_deref()).await?;

    let response = client.list_schemas(&filter).await?;
    let matches: Vec<Value> = array_field(&response, "schemaInfos")
        .into_iter()
        .filter(|info| schema_info_matches(info, &params.text))
        .take(limit)
        .collect();

    info!(text = %params.text, count = matches.len(), "Searched schemas");
    success(
        &ctx,
        json!({ "text": params.text, "count": matches.len(), "schemas": matches }),
    )
}

// ============================================================================
// schema_create
// ============================================================================

#[derive(Debug, Deserialize)]
struct CreateParams {
    authority: String,
    source: String,
    entity_type: String,
    major_version: u32,
    minor_version: u32,
    patch_version: u32,
    schema: Value,
    #[serde(default)]
    status: Option<String>,
}

fn schema_create_tool() -> RegisteredTool {
    ToolBuilder::new("schema_create")
        .description("Create a schema. New schemas default to DEVELOPMENT status. Requires OSDU_MCP_ENABLE_WRITE_MODE=true")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "authority": {"type": "string"},
                "source": {"type": "string"},
                "entity_type": {"type": "string"},
                "major_version": {"type": "integer", "minimum": 0},
                "minor_version": {"type": "integer", "minimum": 0},
                "patch_version": {"type": "integer", "minimum": 0},
                "schema": {"type": "object", "description": "JSON schema definition"},
                "status": {"type": "string", "enum": ["DEVELOPMENT", "PUBLISHED"], "default": "DEVELOPMENT"}
            },
            "required": ["authority", "source", "entity_type", "major_version", "minor_version", "patch_version", "schema"]
        }))
        .category(ToolCategory::Write)
        .build(schema_create_handler)
}

async fn schema_create_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: CreateParams = parse_params(params)?;
    let status = match params.status.as_deref() {
        Some(status) => status.parse::<SchemaStatus>()?,
        None => SchemaStatus::Development,
    };
    let identity = SchemaIdentity {
        authority: params.authority,
        source: params.source,
        entity_type: params.entity_type,
        major: params.major_version,
        minor: params.minor_version,
        patch: params.patch_version,
    };
    let client = ctx.schema_client(None).await?;

    let response = client.create_schema(&identity, params.schema, status).await?;
    let id = identity.id();

    info!(
        target: "audit",
        operation = "create_schema",
        schema_id = %id,
        status = %status,
        partition = %ctx.data_partition(),
        "Schema created"
    );
    success(
        &ctx,
        json!({
            "id": id,
            "status": status.as_str(),
            "schemaInfo": response,
            "created": true,
            "write_enabled": true
        }),
    )
}

// ============================================================================
// schema_update
// ============================================================================

#[derive(Debug, Deserialize)]
struct UpdateParams {
    id: String,
    schema: Value,
    #[serde(default)]
    status: Option<String>,
}

fn schema_update_tool() -> RegisteredTool {
    ToolBuilder::new("schema_update")
        .description("Update a schema that is still in DEVELOPMENT. Requires OSDU_MCP_ENABLE_WRITE_MODE=true")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "id": {"type": "string", "description": "authority:source:entityType:major.minor.patch"},
                "schema": {"type": "object"},
                "status": {"type": "string", "enum": ["DEVELOPMENT", "PUBLISHED", "OBSOLETE"], "default": "DEVELOPMENT"}
            },
            "required": ["id", "schema"]
        }))
        .category(ToolCategory::Write)
        .build(schema_update_handler)
}

async fn schema_update_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: UpdateParams = parse_params(params)?;
    let identity = SchemaIdentity::parse(&params.id)?;
    let status = match params.status.as_deref() {
        Some(status) => status.parse::<SchemaStatus>()?,
        None => SchemaStatus::Development,
    };
    let client = ctx.schema_client(None).await?;

    let response = client.update_schema(&identity, params.schema, status).await?;

    info!(
        target: "audit",
        operation = "update_schema",
        schema_id = %params.id,
        status = %status,
        partition = %ctx.data_partition(),
        "Schema updated"
    );
    success(
        &ctx,
        json!({
            "id": params.id,
            "status": status.as_str(),
            "schemaInfo": response,
            "updated": true,
            "write_enabled": true
        }),
    )
}
