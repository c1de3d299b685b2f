#![allow(dead_code)]

//! Common test infrastructure
//!
//! Builds a [`ToolContext`] wired to in-memory fakes: a recording HTTP
//! transport and a counting credential provider. Tests should only import
//! from this module.

mod constants;
mod fakes;

use std::sync::Arc;
use std::time::Duration;

use osdu_mcp_server::auth::{AuthHandler, AuthenticationMode, SharedAuth};
use osdu_mcp_server::config::{AppConfig, EnvSource, MapEnv};
use osdu_mcp_server::mcp::{create_registry, handle_message, McpState, Session, ToolContext};
use serde_json::{json, Value};

pub use constants::*;
pub use fakes::{CountingCredential, RecordingTransport};

/// A context plus handles on the fakes behind it.
pub struct TestHarness {
    pub state: McpState,
    pub transport: Arc<RecordingTransport>,
    pub credential: CountingCredential,
}

impl TestHarness {
    /// No write or delete permissions.
    pub fn new() -> Self {
        Self::with_env(MapEnv::new())
    }

    pub fn with_env(env: MapEnv) -> Self {
        Self::with_env_and_transport(env, RecordingTransport::new())
    }

    pub fn with_env_and_transport(env: MapEnv, transport: RecordingTransport) -> Self {
        let env: Arc<dyn EnvSource> = Arc::new(env);
        let transport = Arc::new(transport);
        let credential = CountingCredential::new(TOKEN);

        let handler = AuthHandler::with_credential(
            AuthenticationMode::Azure,
            Some(CLIENT_ID.to_string()),
            Box::new(credential.clone()),
        );
        let auth = Arc::new(SharedAuth::with_handler(env.clone(), handler));

        let config = AppConfig {
            server_url: SERVER_URL.to_string(),
            data_partition: PARTITION.to_string(),
            domain: DOMAIN.to_string(),
            timeout: Duration::from_secs(5),
        };
        let ctx = ToolContext::new(Arc::new(config), env, auth, transport.clone());

        Self {
            state: McpState {
                registry: Arc::new(create_registry()),
                ctx,
            },
            transport,
            credential,
        }
    }

    /// Run a tool through its registered handler and parse the JSON body.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, ToolFailure> {
        let tool = self
            .state
            .registry
            .get_tool(name)
            .unwrap_or_else(|| panic!("tool {} not registered", name));

        match (tool.handler)(self.state.ctx.clone(), arguments).await {
            Ok(result) => {
                Ok(serde_json::from_str(&result.content[0].text).expect("tool output is JSON"))
            }
            Err(e) => Err(ToolFailure {
                code: e.code(),
                message: e.message(),
            }),
        }
    }

    /// Send one JSON-RPC message through the dispatcher.
    pub async fn send(&self, session: &mut Session, message: Value) -> Option<Value> {
        handle_message(&message.to_string(), &self.state, session)
            .await
            .map(|response| serde_json::to_value(response).unwrap())
    }

    /// A session that has already completed `initialize`.
    pub async fn initialized_session(&self) -> Session {
        let mut session = Session::default();
        self.send(
            &mut session,
            json!({
                "jsonrpc": "2.0",
                "id": 0,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "test", "version": "1.0"}
                }
            }),
        )
        .await;
        session
    }
}

#[derive(Debug)]
pub struct ToolFailure {
    pub code: i32,
    pub message: String,
}
