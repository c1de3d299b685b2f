//! Legal Tag Tools

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{array_field, parse_params, require_confirmation, success, user_token_schema};
use crate::client::{LegalTagSearch, LegalTagUpdate, MAX_BATCH_RETRIEVE};
use crate::mcp::context::ToolContext;
use crate::mcp::registry::{McpRegistry, RegisteredTool, ToolBuilder, ToolCategory, ToolResult};

pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(legaltag_list_tool());
    registry.register_tool(legaltag_get_tool());
    registry.register_tool(legaltag_get_properties_tool());
    registry.register_tool(legaltag_search_tool());
    registry.register_tool(legaltag_batch_retrieve_tool());
    registry.register_tool(legaltag_create_tool());
    registry.register_tool(legaltag_update_tool());
    registry.register_tool(legaltag_delete_tool());
}

// ============================================================================
// legaltag_list
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListParams {
    #[serde(default)]
    valid: Option<bool>,
    #[serde(default)]
    user_token: Option<String>,
}

fn legaltag_list_tool() -> RegisteredTool {
    ToolBuilder::new("legaltag_list")
        .description("List legal tags in the data partition, optionally only valid or only invalid ones")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "valid": {
                    "type": "boolean",
                    "description": "true for valid tags only, false for invalid tags only; omit for all"
                },
                "user_token": user_token_schema()
            }
        }))
        .category(ToolCategory::Read)
        .build(legaltag_list_handler)
}

async fn legaltag_list_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: ListParams = parse_params(params)?;
    let client = ctx.legal_client(params.user_token.as_deref()).await?;

    let response = client.list_legal_tags(params.valid).await?;
    let tags = array_field(&response, "legalTags");

    info!(count = tags.len(), partition = %ctx.data_partition(), "Listed legal tags");
    success(&ctx, json!({ "count": tags.len(), "legalTags": tags }))
}

// ============================================================================
// legaltag_get
// ============================================================================

#[derive(Debug, Deserialize)]
struct GetParams {
    name: String,
    #[serde(default)]
    user_token: Option<String>,
}

fn legaltag_get_tool() -> RegisteredTool {
    ToolBuilder::new("legaltag_get")
        .description("Get a legal tag by name, with or without the partition prefix")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "description": "Legal tag name"},
                "user_token": user_token_schema()
            },
            "required": ["name"]
        }))
        .category(ToolCategory::Read)
        .build(legaltag_get_handler)
}

async fn legaltag_get_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: GetParams = parse_params(params)?;
    let client = ctx.legal_client(params.user_token.as_deref()).await?;

    let tag = client.get_legal_tag(&params.name).await?;

    info!(tag_name = %client.full_name(&params.name), "Retrieved legal tag");
    success(&ctx, json!({ "legalTag": tag }))
}

// ============================================================================
// legaltag_get_properties
// ============================================================================

#[derive(Debug, Deserialize)]
struct PropertiesParams {
    #[serde(default)]
    user_token: Option<String>,
}

fn legaltag_get_properties_tool() -> RegisteredTool {
    ToolBuilder::new("legaltag_get_properties")
        .description(
            "Get allowed values for legal tag properties (countries, security classifications, \
             export classifications, personal data types, data types)",
        )
        .input_schema(json!({
            "type": "object",
            "properties": {
                "user_token": user_token_schema()
            }
        }))
        .category(ToolCategory::Read)
        .build(legaltag_get_properties_handler)
}

async fn legaltag_get_properties_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: PropertiesParams = parse_params(params)?;
    let client = ctx.legal_client(params.user_token.as_deref()).await?;

    let properties = client.get_legal_tag_properties().await?;

    info!("Retrieved legal tag properties");
    success(&ctx, json!({ "properties": properties }))
}

// ============================================================================
// legaltag_search
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    query: Option<Vec<String>>,
    #[serde(default)]
    sort_by: Option<String>,
    #[serde(default)]
    sort_order: Option<String>,
    #[serde(default)]
    limit: Option<u32>,
    #[serde(default)]
    user_token: Option<String>,
}

fn legaltag_search_tool() -> RegisteredTool {
    ToolBuilder::new("legaltag_search")
        .description("Search legal tags with filter conditions such as \"name=opendes-*\"")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Filter conditions"
                },
                "sort_by": {"type": "string", "description": "Field to sort by"},
                "sort_order": {"type": "string", "enum": ["ASC", "DESC"]},
                "limit": {"type": "integer", "minimum": 1},
                "user_token": user_token_schema()
            }
        }))
        .category(ToolCategory::Read)
        .build(legaltag_search_handler)
}

async fn legaltag_search_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: SearchParams = parse_params(params)?;
    let client = ctx.legal_client(params.user_token.as_deref()).await?;

    let search = LegalTagSearch {
        query: params.query,
        sort_by: params.sort_by,
        sort_order: params.sort_order,
        limit: params.limit,
    };
    let response = client.search_legal_tags(&search).await?;
    let tags = array_field(&response, "legalTags");

    info!(count = tags.len(), "Searched legal tags");
    success(&ctx, json!({ "count": tags.len(), "legalTags": tags }))
}

// ============================================================================
// legaltag_batch_retrieve
// ============================================================================

#[derive(Debug, Deserialize)]
struct BatchParams {
    names: Vec<String>,
    #[serde(default)]
    user_token: Option<String>,
}

fn legaltag_batch_retrieve_tool() -> RegisteredTool {
    ToolBuilder::new("legaltag_batch_retrieve")
        .description(format!(
            "Retrieve up to {} legal tags by name in one call",
            MAX_BATCH_RETRIEVE
        ))
        .input_schema(json!({
            "type": "object",
            "properties": {
                "names": {
                    "type": "array",
                    "items": {"type": "string"},
                    "maxItems": MAX_BATCH_RETRIEVE
                },
                "user_token": user_token_schema()
            },
            "required": ["names"]
        }))
        .category(ToolCategory::Read)
        .build(legaltag_batch_retrieve_handler)
}

async fn legaltag_batch_retrieve_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: BatchParams = parse_params(params)?;
    let client = ctx.legal_client(params.user_token.as_deref()).await?;

    let response = client.batch_retrieve_legal_tags(&params.names).await?;
    let tags = array_field(&response, "legalTags");

    info!(requested = params.names.len(), found = tags.len(), "Batch retrieved legal tags");
    success(&ctx, json!({ "count": tags.len(), "legalTags": tags }))
}

// ============================================================================
// legaltag_create
// ============================================================================

#[derive(Debug, Deserialize)]
struct CreateParams {
    name: String,
    description: String,
    properties: Value,
}

fn legaltag_create_tool() -> RegisteredTool {
    ToolBuilder::new("legaltag_create")
        .description("Create a legal tag. Requires OSDU_MCP_ENABLE_WRITE_MODE=true")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "description": "Tag name; the partition prefix is added by the service"},
                "description": {"type": "string"},
                "properties": {
                    "type": "object",
                    "description": "countryOfOrigin, contractId, expirationDate, originator, dataType, securityClassification, personalData, exportClassification"
                }
            },
            "required": ["name", "description", "properties"]
        }))
        .category(ToolCategory::Write)
        .build(legaltag_create_handler)
}

async fn legaltag_create_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: CreateParams = parse_params(params)?;
    let client = ctx.legal_client(None).await?;

    let tag = client
        .create_legal_tag(&params.name, &params.description, params.properties)
        .await?;
    let full_name = client.full_name(&params.name);

    info!(
        target: "audit",
        operation = "create_legal_tag",
        tag_name = %full_name,
        partition = %ctx.data_partition(),
        "Legal tag created"
    );
    success(
        &ctx,
        json!({ "legalTag": tag, "name": full_name, "created": true, "write_enabled": true }),
    )
}

// ============================================================================
// legaltag_update
// ============================================================================

#[derive(Debug, Deserialize)]
struct UpdateParams {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    contract_id: Option<String>,
    #[serde(default)]
    expiration_date: Option<String>,
    #[serde(default)]
    extension_properties: Option<Value>,
}

fn legaltag_update_tool() -> RegisteredTool {
    ToolBuilder::new("legaltag_update")
        .description("Update an existing legal tag. Requires OSDU_MCP_ENABLE_WRITE_MODE=true")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "description": "Legal tag name, with or without the partition prefix"},
                "description": {"type": "string"},
                "contract_id": {"type": "string"},
                "expiration_date": {"type": "string", "description": "YYYY-MM-DD"},
                "extension_properties": {"type": "object"}
            },
            "required": ["name"]
        }))
        .category(ToolCategory::Write)
        .build(legaltag_update_handler)
}

async fn legaltag_update_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: UpdateParams = parse_params(params)?;
    let client = ctx.legal_client(None).await?;

    let update = LegalTagUpdate {
        description: params.description,
        contract_id: params.contract_id,
        expiration_date: params.expiration_date,
        extension_properties: params.extension_properties,
    };
    let tag = client.update_legal_tag(&params.name, update).await?;

    info!(
        target: "audit",
        operation = "update_legal_tag",
        tag_name = %client.full_name(&params.name),
        partition = %ctx.data_partition(),
        "Legal tag updated"
    );
    success(
        &ctx,
        json!({ "legalTag": tag, "updated": true, "write_enabled": true }),
    )
}

// ============================================================================
// legaltag_delete
// ============================================================================

#[derive(Debug, Deserialize)]
struct DeleteParams {
    name: String,
    #[serde(default)]
    confirm: bool,
}

fn legaltag_delete_tool() -> RegisteredTool {
    ToolBuilder::new("legaltag_delete")
        .description(
            "Delete a legal tag. All data referencing it becomes invalid. \
             Requires confirm=true and OSDU_MCP_ENABLE_DELETE_MODE=true",
        )
        .input_schema(json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "confirm": {"type": "boolean", "description": "Must be true"}
            },
            "required": ["name", "confirm"]
        }))
        .category(ToolCategory::Delete)
        .build(legaltag_delete_handler)
}

async fn legaltag_delete_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: DeleteParams = parse_params(params)?;
    require_confirmation(
        params.confirm,
        "Deletion not confirmed. Set confirm=true to delete the legal tag. \
         WARNING: This will invalidate all associated data.",
    )?;

    let client = ctx.legal_client(None).await?;
    client.delete_legal_tag(&params.name).await?;
    let full_name = client.full_name(&params.name);

    info!(
        target: "audit",
        operation = "delete_legal_tag",
        tag_name = %full_name,
        partition = %ctx.data_partition(),
        "Legal tag deleted"
    );
    success(
        &ctx,
        json!({
            "deleted": true,
            "name": full_name,
            "delete_enabled": true,
            "warning": "Associated data is now invalid"
        }),
    )
}
