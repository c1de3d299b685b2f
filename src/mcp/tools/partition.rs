//! Partition Tools

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{parse_params, require_confirmation, success, user_token_schema};
use crate::client::redact_sensitive;
use crate::mcp::context::ToolContext;
use crate::mcp::registry::{McpRegistry, RegisteredTool, ToolBuilder, ToolCategory, ToolResult};

pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(partition_list_tool());
    registry.register_tool(partition_get_tool());
    registry.register_tool(partition_create_tool());
    registry.register_tool(partition_update_tool());
    registry.register_tool(partition_delete_tool());
}

#[derive(Debug, Deserialize)]
struct ListParams {
    #[serde(default)]
    user_token: Option<String>,
}

fn partition_list_tool() -> RegisteredTool {
    ToolBuilder::new("partition_list")
        .description("List all data partition ids")
        .input_schema(json!({
            "type": "object",
            "properties": { "user_token": user_token_schema() }
        }))
        .category(ToolCategory::Read)
        .build(partition_list_handler)
}

async fn partition_list_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: ListParams = parse_params(params)?;
    let client = ctx.partition_client(params.user_token.as_deref()).await?;

    let response = client.list_partitions().await?;
    let partitions = match response {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    };

    info!(count = partitions.len(), "Listed partitions");
    success(
        &ctx,
        json!({ "count": partitions.len(), "partitions": partitions }),
    )
}

#[derive(Debug, Deserialize)]
struct GetParams {
    partition_id: String,
    #[serde(default)]
    include_sensitive: bool,
    #[serde(default)]
    user_token: Option<String>,
}

fn partition_get_tool() -> RegisteredTool {
    ToolBuilder::new("partition_get")
        .description(
            "Get a partition's properties. Values of properties flagged sensitive are \
             redacted unless include_sensitive=true",
        )
        .input_schema(json!({
            "type": "object",
            "properties": {
                "partition_id": {"type": "string"},
                "include_sensitive": {"type": "boolean", "default": false},
                "user_token": user_token_schema()
            },
            "required": ["partition_id"]
        }))
        .category(ToolCategory::Read)
        .build(partition_get_handler)
}

async fn partition_get_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: GetParams = parse_params(params)?;
    let client = ctx.partition_client(params.user_token.as_deref()).await?;

    let mut properties = client.get_partition(&params.partition_id).await?;
    let mut redacted = 0;
    if !params.include_sensitive {
        if let Some(map) = properties.as_object_mut() {
            redacted = redact_sensitive(map);
        }
    }

    info!(partition_id = %params.partition_id, redacted, "Retrieved partition");
    success(
        &ctx,
        json!({
            "partition_id": params.partition_id,
            "properties": properties,
            "sensitive_redacted": redacted,
        }),
    )
}

#[derive(Debug, Deserialize)]
struct WriteParams {
    partition_id: String,
    properties: Value,
}

fn write_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "partition_id": {"type": "string"},
            "properties": {
                "type": "object",
                "description": "Map of property name to {\"sensitive\": bool, \"value\": any}"
            }
        },
        "required": ["partition_id", "properties"]
    })
}

fn partition_create_tool() -> RegisteredTool {
    ToolBuilder::new("partition_create")
        .description("Create a data partition. Requires OSDU_MCP_ENABLE_WRITE_MODE=true")
        .input_schema(write_schema())
        .category(ToolCategory::Write)
        .build(partition_create_handler)
}

async fn partition_create_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: WriteParams = parse_params(params)?;
    let client = ctx.partition_client(None).await?;

    client
        .create_partition(&params.partition_id, params.properties)
        .await?;

    info!(
        target: "audit",
        operation = "create_partition",
        partition_id = %params.partition_id,
        partition = %ctx.data_partition(),
        "Partition created"
    );
    success(
        &ctx,
        json!({ "partition_id": params.partition_id, "created": true, "write_enabled": true }),
    )
}

fn partition_update_tool() -> RegisteredTool {
    ToolBuilder::new("partition_update")
        .description(
            "Add or change properties of a data partition. Requires OSDU_MCP_ENABLE_WRITE_MODE=true",
        )
        .input_schema(write_schema())
        .category(ToolCategory::Write)
        .build(partition_update_handler)
}

async fn partition_update_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: WriteParams = parse_params(params)?;
    let client = ctx.partition_client(None).await?;

    client
        .update_partition(&params.partition_id, params.properties)
        .await?;

    info!(
        target: "audit",
        operation = "update_partition",
        partition_id = %params.partition_id,
        partition = %ctx.data_partition(),
        "Partition updated"
    );
    success(
        &ctx,
        json!({ "partition_id": params.partition_id, "updated": true, "write_enabled": true }),
    )
}

#[derive(Debug, Deserialize)]
struct DeleteParams {
    partition_id: String,
    #[serde(default)]
    confirm: bool,
}

fn partition_delete_tool() -> RegisteredTool {
    ToolBuilder::new("partition_delete")
        .description(
            "Delete a data partition and its configuration. \
             Requires confirm=true and OSDU_MCP_ENABLE_DELETE_MODE=true",
        )
        .input_schema(json!({
            "type": "object",
            "properties": {
                "partition_id": {"type": "string"},
                "confirm": {"type": "boolean", "description": "Must be true"}
            },
            "required": ["partition_id", "confirm"]
        }))
        .category(ToolCategory::Delete)
        .build(partition_delete_handler)
}

async fn partition_delete_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: DeleteParams = parse_params(params)?;
    require_confirmation(
        params.confirm,
        "Deletion not confirmed. Set confirm=true to delete the partition.",
    )?;

    let client = ctx.partition_client(None).await?;
    client.delete_partition(&params.partition_id).await?;

    info!(
        target: "audit",
        operation = "delete_partition",
        partition_id = %params.partition_id,
        partition = %ctx.data_partition(),
        "Partition deleted"
    );
    success(
        &ctx,
        json!({ "partition_id": params.partition_id, "deleted": true, "delete_enabled": true }),
    )
}
