//! MCP Prompts

use std::fmt::Write;

use serde_json::Value;

use super::context::ToolContext;
use super::protocol::PromptMessage;
use super::registry::{McpRegistry, PromptBuilder, PromptResult, RegisteredPrompt, ToolCategory};
use crate::config::{ENV_ENABLE_DELETE_MODE, ENV_ENABLE_WRITE_MODE};

const GUIDE_SEARCH_PATTERNS: &str = include_str!("assets/guide_search_patterns.md");
const GUIDE_RECORD_LIFECYCLE: &str = include_str!("assets/guide_record_lifecycle.md");

pub fn register_all_prompts(registry: &mut McpRegistry) {
    registry.register_prompt(list_mcp_assets_prompt());
    registry.register_prompt(static_prompt(
        "guide_search_patterns",
        "How to find records, schemas and legal tags with this server",
        GUIDE_SEARCH_PATTERNS,
    ));
    registry.register_prompt(static_prompt(
        "guide_record_lifecycle",
        "Step-by-step record lifecycle: legal tag, schema, creation, validation, cleanup",
        GUIDE_RECORD_LIFECYCLE,
    ));
}

fn static_prompt(
    name: &'static str,
    description: &'static str,
    body: &'static str,
) -> RegisteredPrompt {
    PromptBuilder::new(name)
        .description(description)
        .build(move |_registry, _ctx, _args| Ok(vec![PromptMessage::user(body)]))
}

fn list_mcp_assets_prompt() -> RegisteredPrompt {
    PromptBuilder::new("list_mcp_assets")
        .description("Overview of every tool, resource and prompt this server provides")
        .build(list_mcp_assets)
}

fn list_mcp_assets(registry: &McpRegistry, ctx: &ToolContext, _args: &Value) -> PromptResult {
    Ok(vec![PromptMessage::user(render_assets(registry, ctx))])
}

/// Markdown overview of the registry contents.
pub fn render_assets(registry: &McpRegistry, ctx: &ToolContext) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# OSDU MCP Server Assets\n");
    let _ = writeln!(
        out,
        "Server `{}`, data partition `{}`, version {}.\n",
        ctx.config.server_url,
        ctx.config.data_partition,
        ctx.server_version
    );

    let sections = [
        (ToolCategory::Read, "Read tools".to_string()),
        (
            ToolCategory::Write,
            format!("Write tools (require `{}=true`)", ENV_ENABLE_WRITE_MODE),
        ),
        (
            ToolCategory::Delete,
            format!(
                "Delete tools (require `{}=true` and `confirm=true`)",
                ENV_ENABLE_DELETE_MODE
            ),
        ),
    ];
    let _ = writeln!(out, "## Tools ({})\n", registry.tool_count());
    for (category, title) in sections {
        let tools = registry.tools_in_category(category);
        if tools.is_empty() {
            continue;
        }
        let _ = writeln!(out, "### {}\n", title);
        for tool in tools {
            let _ = writeln!(out, "- `{}`: {}", tool.name, tool.description);
        }
        out.push('\n');
    }

    let _ = writeln!(out, "## Resources ({})\n", registry.resource_count());
    for resource in registry.list_resources() {
        let _ = writeln!(
            out,
            "- `{}`: {}",
            resource.uri,
            resource.description.unwrap_or_default()
        );
    }
    out.push('\n');

    let _ = writeln!(out, "## Prompts ({})\n", registry.prompt_count());
    for prompt in registry.list_prompts() {
        let _ = writeln!(out, "- `{}`: {}", prompt.name, prompt.description);
    }

    out
}
