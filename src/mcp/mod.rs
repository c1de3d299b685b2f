//! MCP (Model Context Protocol) server
//!
//! Exposes the OSDU services as MCP tools, resources and prompts over stdio.

pub mod context;
pub mod handler;
pub mod prompts;
pub mod protocol;
pub mod registry;
pub mod resources;
pub mod tools;

pub use context::ToolContext;
pub use handler::{create_registry, handle_message, run_stdio, serve, McpState, Session};
pub use registry::McpRegistry;
