//! MCP stdio Handler
//!
//! Newline-delimited JSON-RPC on stdin/stdout. Nothing else may write to
//! stdout; logs go to stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use super::context::{server_version, ToolContext};
use super::protocol::{
    methods, InitializeParams, InitializeResult, McpError, McpRequest, McpResponse, PingResult,
    PromptsCapability, PromptsGetParams, PromptsGetResult, PromptsListResult,
    ResourcesCapability, ResourcesListResult, ResourcesReadParams, ResourcesReadResult,
    ServerCapabilities, ServerInfo, ToolsCallParams, ToolsCapability, ToolsListResult,
    MCP_PROTOCOL_VERSION,
};
use super::registry::McpRegistry;

pub const SERVER_NAME: &str = "osdu-mcp-server";

/// State shared across the connection
pub struct McpState {
    pub registry: Arc<McpRegistry>,
    pub ctx: ToolContext,
}

/// Per-connection protocol state
#[derive(Debug, Default)]
pub struct Session {
    pub initialized: bool,
    pub shutdown_requested: bool,
}

/// Serve MCP on the process's stdin/stdout until EOF or `shutdown`.
pub async fn run_stdio(state: Arc<McpState>) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve(stdin, stdout, &state).await
}

/// Serve MCP over any line-oriented reader/writer pair.
pub async fn serve<R, W>(reader: R, mut writer: W, state: &McpState) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut session = Session::default();
    info!("MCP stdio session started");

    while let Some(line) = lines.next_line().await.context("Failed to read from stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        if let Some(response) = handle_message(&line, state, &mut session).await {
            match serde_json::to_string(&response) {
                Ok(json) => {
                    writer
                        .write_all(json.as_bytes())
                        .await
                        .context("Failed to write response")?;
                    writer.write_all(b"\n").await?;
                    writer.flush().await?;
                }
                Err(e) => {
                    error!("Failed to serialize MCP response: {}", e);
                }
            }
        }

        if session.shutdown_requested {
            break;
        }
    }

    state.ctx.auth.close().await;
    info!("MCP stdio session closed");
    Ok(())
}

/// Handle a single MCP message. Returns `None` for notifications.
pub async fn handle_message(
    text: &str,
    state: &McpState,
    session: &mut Session,
) -> Option<McpResponse> {
    let request: McpRequest = match serde_json::from_str(text) {
        Ok(req) => req,
        Err(e) => {
            return Some(McpResponse::error(
                None,
                McpError::ParseError(e.to_string()),
            ));
        }
    };

    let is_notification = request.is_notification();
    let request_id = request.id.clone();
    debug!(method = %request.method, "MCP request");

    let result = match request.method.as_str() {
        methods::INITIALIZE => handle_initialize(&request, session),
        methods::INITIALIZED => return None,
        methods::PING => handle_ping(),
        method if !session.initialized => {
            Err(McpError::InvalidRequest(format!("Not initialized: {}", method)))
        }
        methods::SHUTDOWN => {
            session.shutdown_requested = true;
            Ok(Value::Null)
        }
        methods::TOOLS_LIST => handle_tools_list(state),
        methods::TOOLS_CALL => handle_tools_call(&request, state).await,
        methods::RESOURCES_LIST => handle_resources_list(state),
        methods::RESOURCES_READ => handle_resources_read(&request, state).await,
        methods::PROMPTS_LIST => handle_prompts_list(state),
        methods::PROMPTS_GET => handle_prompts_get(&request, state),
        other => Err(McpError::MethodNotFound(other.to_string())),
    };

    if is_notification {
        if let Err(e) = result {
            warn!(method = %request.method, error = %e.message(), "Notification failed");
        }
        return None;
    }

    Some(match result {
        Ok(value) => McpResponse::success(request_id, value),
        Err(error) => McpResponse::error(request_id, error),
    })
}

fn handle_initialize(request: &McpRequest, session: &mut Session) -> Result<Value, McpError> {
    let params: Option<InitializeParams> = request
        .params
        .clone()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))?;

    if let Some(params) = &params {
        info!(
            client = %params.client_info.name,
            client_version = %params.client_info.version,
            protocol = %params.protocol_version,
            "MCP client connected"
        );
    }

    session.initialized = true;

    let result = InitializeResult {
        protocol_version: MCP_PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability { list_changed: None }),
            resources: Some(ResourcesCapability {
                subscribe: Some(false),
                list_changed: None,
            }),
            prompts: Some(PromptsCapability { list_changed: None }),
        },
        server_info: ServerInfo {
            name: SERVER_NAME.to_string(),
            version: server_version(),
        },
    };

    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

fn handle_ping() -> Result<Value, McpError> {
    serde_json::to_value(PingResult {}).map_err(|e| McpError::InternalError(e.to_string()))
}

fn handle_tools_list(state: &McpState) -> Result<Value, McpError> {
    let result = ToolsListResult {
        tools: state.registry.list_tools(),
    };
    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

async fn handle_tools_call(request: &McpRequest, state: &McpState) -> Result<Value, McpError> {
    let params: ToolsCallParams = parse_required_params(request)?;

    let tool = state
        .registry
        .get_tool(&params.name)
        .ok_or_else(|| McpError::MethodNotFound(format!("Unknown tool: {}", params.name)))?;

    let arguments = match params.arguments {
        Some(Value::Null) | None => serde_json::json!({}),
        Some(arguments) => arguments,
    };

    debug!(tool = %tool.name, category = tool.category.as_str(), "Calling tool");
    let result = (tool.handler)(state.ctx.clone(), arguments).await;
    if let Err(e) = &result {
        warn!(tool = %tool.name, code = e.code(), error = %e.message(), "Tool failed");
    }

    serde_json::to_value(result?).map_err(|e| McpError::InternalError(e.to_string()))
}

fn handle_resources_list(state: &McpState) -> Result<Value, McpError> {
    let result = ResourcesListResult {
        resources: state.registry.list_resources(),
    };
    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

async fn handle_resources_read(request: &McpRequest, state: &McpState) -> Result<Value, McpError> {
    let params: ResourcesReadParams = parse_required_params(request)?;

    let resource = state
        .registry
        .find_resource(&params.uri)
        .ok_or_else(|| McpError::ResourceNotFound(params.uri.clone()))?;

    let contents = (resource.handler)(state.ctx.clone(), params.uri).await?;
    let result = ResourcesReadResult { contents };

    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

fn handle_prompts_list(state: &McpState) -> Result<Value, McpError> {
    let result = PromptsListResult {
        prompts: state.registry.list_prompts(),
    };
    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

fn handle_prompts_get(request: &McpRequest, state: &McpState) -> Result<Value, McpError> {
    let params: PromptsGetParams = parse_required_params(request)?;

    let prompt = state
        .registry
        .get_prompt(&params.name)
        .ok_or_else(|| McpError::InvalidParams(format!("Unknown prompt: {}", params.name)))?;

    let arguments = params.arguments.unwrap_or(Value::Null);
    let messages = (prompt.handler)(&state.registry, &state.ctx, &arguments)?;
    let result = PromptsGetResult {
        description: prompt.description.clone(),
        messages,
    };

    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

fn parse_required_params<T: serde::de::DeserializeOwned>(
    request: &McpRequest,
) -> Result<T, McpError> {
    request
        .params
        .clone()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))?
        .ok_or_else(|| McpError::InvalidParams("Missing params".to_string()))
}

/// Create the MCP registry with all tools, resources and prompts
pub fn create_registry() -> McpRegistry {
    let mut registry = McpRegistry::new();

    super::tools::register_all_tools(&mut registry);
    super::resources::register_all_resources(&mut registry);
    super::prompts::register_all_prompts(&mut registry);

    info!(
        "MCP registry initialized with {} tools, {} resources and {} prompts",
        registry.tool_count(),
        registry.resource_count(),
        registry.prompt_count()
    );

    registry
}
