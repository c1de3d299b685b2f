//! Entitlements Tools

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{array_field, parse_params, success, user_token_schema};
use crate::mcp::context::ToolContext;
use crate::mcp::registry::{McpRegistry, RegisteredTool, ToolBuilder, ToolCategory, ToolResult};

pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(entitlements_mine_tool());
}

#[derive(Debug, Deserialize)]
struct MineParams {
    #[serde(default)]
    user_token: Option<String>,
}

fn entitlements_mine_tool() -> RegisteredTool {
    ToolBuilder::new("entitlements_mine")
        .description(
            "List the entitlement groups of the current identity. Group emails reveal the \
             ACL domain (e.g. data.default.viewers@opendes.contoso.com)",
        )
        .input_schema(json!({
            "type": "object",
            "properties": { "user_token": user_token_schema() }
        }))
        .category(ToolCategory::Read)
        .build(entitlements_mine_handler)
}

async fn entitlements_mine_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: MineParams = parse_params(params)?;
    let client = ctx.entitlements_client(params.user_token.as_deref()).await?;

    let response = client.my_groups().await?;
    let groups = array_field(&response, "groups");

    info!(count = groups.len(), "Retrieved entitlement groups");
    success(
        &ctx,
        json!({
            "count": groups.len(),
            "groups": groups,
            "desId": response.get("desId").cloned().unwrap_or(Value::Null),
            "memberEmail": response.get("memberEmail").cloned().unwrap_or(Value::Null),
        }),
    )
}
