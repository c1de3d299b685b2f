//! Health Check Tool
//!
//! Reports on authentication and service reachability. Unhealthy dependencies
//! are reported in the result, never raised as errors.

use chrono::Utc;
use futures::future::join_all;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::{parse_params, success};
use crate::client::{Service, ServiceClient};
use crate::mcp::context::ToolContext;
use crate::mcp::registry::{McpRegistry, RegisteredTool, ToolBuilder, ToolCategory, ToolResult};

pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(health_check_tool());
}

#[derive(Debug, Deserialize)]
struct HealthParams {
    #[serde(default = "default_true")]
    include_services: bool,
    #[serde(default = "default_true")]
    include_auth: bool,
}

fn default_true() -> bool {
    true
}

fn health_check_tool() -> RegisteredTool {
    ToolBuilder::new("health_check")
        .description(
            "Check connectivity to the OSDU platform: authentication status and \
             reachability of the partition, entitlements, legal, schema and storage services",
        )
        .input_schema(json!({
            "type": "object",
            "properties": {
                "include_services": {"type": "boolean", "default": true},
                "include_auth": {"type": "boolean", "default": true}
            }
        }))
        .category(ToolCategory::Read)
        .build(health_check_handler)
}

async fn health_check_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: HealthParams = parse_params(params)?;
    let mut healthy = true;

    let mut payload = Map::new();
    payload.insert("server_url".to_string(), json!(ctx.config.server_url));
    payload.insert("timestamp".to_string(), json!(Utc::now().to_rfc3339()));
    payload.insert("server_version".to_string(), json!(ctx.server_version));
    payload.insert(
        "uptime_seconds".to_string(),
        json!(ctx.start_time.elapsed().as_secs()),
    );

    if params.include_auth {
        let (ok, auth) = check_auth(&ctx).await;
        healthy &= ok;
        payload.insert("authentication".to_string(), auth);
    }

    if params.include_services {
        let (ok, services) = check_services(&ctx).await;
        healthy &= ok;
        payload.insert("services".to_string(), services);
    }

    let status = if healthy { "healthy" } else { "degraded" };
    payload.insert("status".to_string(), json!(status));

    info!(status, "Health check completed");
    success(&ctx, Value::Object(payload))
}

async fn check_auth(ctx: &ToolContext) -> (bool, Value) {
    let handler = match ctx.auth.get().await {
        Ok(handler) => handler,
        Err(e) => {
            warn!(error = %e, "Authentication not configured");
            return (false, json!({ "status": "error", "message": e.to_string() }));
        }
    };

    match handler.validate_token().await {
        Ok(true) => (
            true,
            json!({
                "status": "authenticated",
                "mode": handler.mode().map(|m| m.as_str()),
                "provider": handler.provider_name()
            }),
        ),
        Ok(false) => (
            false,
            json!({
                "status": "failed",
                "mode": handler.mode().map(|m| m.as_str()),
                "message": "Token acquisition failed; check credentials"
            }),
        ),
        Err(e) => (false, json!({ "status": "error", "message": e.to_string() })),
    }
}

async fn check_services(ctx: &ToolContext) -> (bool, Value) {
    let rest = match ctx.rest_client(None).await {
        Ok(rest) => rest,
        Err(e) => {
            let services: Map<String, Value> = Service::ALL
                .iter()
                .map(|s| {
                    (
                        s.name().to_string(),
                        json!({ "status": "unknown", "message": e.to_string() }),
                    )
                })
                .collect();
            return (false, Value::Object(services));
        }
    };
    let clients: Vec<ServiceClient> = Service::ALL
        .iter()
        .map(|service| ServiceClient::new(*service, rest.clone(), ctx.env.clone()))
        .collect();

    let results = join_all(clients.iter().map(|client| async move {
        let outcome = client.get("/info", &[]).await;
        (client.service(), outcome)
    }))
    .await;

    let mut all_healthy = true;
    let mut services = Map::new();
    for (service, outcome) in results {
        let entry = match outcome {
            Ok(info) => json!({
                "status": "healthy",
                "version": info.get("version").cloned().unwrap_or(Value::Null)
            }),
            Err(e) => {
                all_healthy = false;
                warn!(service = %service, error = %e, "Service health check failed");
                json!({
                    "status": "unhealthy",
                    "error_type": e.kind(),
                    "message": e.to_string()
                })
            }
        };
        services.insert(service.name().to_string(), entry);
    }

    (all_healthy, Value::Object(services))
}
