//! MCP Tools
//!
//! One module per OSDU service, plus the health check.

pub mod entitlements;
pub mod health;
pub mod legal;
pub mod partition;
pub mod schema;
pub mod storage;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::context::ToolContext;
use super::protocol::{McpError, ToolsCallResult};
use super::registry::{McpRegistry, ToolResult};
use crate::client::OsduError;

/// Register all tools with the registry
pub fn register_all_tools(registry: &mut McpRegistry) {
    health::register_tools(registry);
    partition::register_tools(registry);
    entitlements::register_tools(registry);
    legal::register_tools(registry);
    schema::register_tools(registry);
    storage::register_tools(registry);
}

/// Deserialize tool arguments.
pub(crate) fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, McpError> {
    serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))
}

/// Wrap a tool payload in the standard envelope:
/// `{"success": true, ...payload, "partition": <partition>}`.
pub(crate) fn success(ctx: &ToolContext, payload: Value) -> ToolResult {
    let mut body = Map::new();
    body.insert("success".to_string(), Value::Bool(true));
    if let Value::Object(fields) = payload {
        body.extend(fields);
    }
    body.insert(
        "partition".to_string(),
        Value::String(ctx.data_partition().to_string()),
    );
    ToolsCallResult::json(&Value::Object(body)).map_err(|e| McpError::InternalError(e.to_string()))
}

/// Destructive tools require an explicit `confirm: true`.
pub(crate) fn require_confirmation(confirm: bool, message: &str) -> Result<(), OsduError> {
    if confirm {
        Ok(())
    } else {
        Err(OsduError::Validation(message.to_string()))
    }
}

/// The array under `key`, or an empty array.
pub(crate) fn array_field(value: &Value, key: &str) -> Vec<Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// JSON schema fragment for the optional `user_token` argument.
pub(crate) fn user_token_schema() -> Value {
    serde_json::json!({
        "type": "string",
        "description": "Optional bearer token to use for this call instead of the server's credentials"
    })
}
