//! MCP Tool, Resource and Prompt Registry

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use super::context::ToolContext;
use super::protocol::{
    McpError, PromptDefinition, PromptMessage, ResourceContent,
    ResourceDefinition, ToolDefinition, ToolsCallResult,
};

pub type ToolResult = Result<ToolsCallResult, McpError>;
pub type ToolFuture = Pin<Box<dyn Future<Output = ToolResult> + Send>>;
pub type ToolHandler = Arc<dyn Fn(ToolContext, Value) -> ToolFuture + Send + Sync>;

pub struct RegisteredTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub handler: ToolHandler,
    pub category: ToolCategory,
}

/// What a tool does to OSDU state; write and delete tools are gated by the
/// matching permission flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCategory {
    Read,
    Write,
    Delete,
}

impl ToolCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolCategory::Read => "read",
            ToolCategory::Write => "write",
            ToolCategory::Delete => "delete",
        }
    }
}

/// Resources receive the requested URI so one handler can serve a template.
pub type ResourceResult = Result<Vec<ResourceContent>, McpError>;
pub type ResourceFuture = Pin<Box<dyn Future<Output = ResourceResult> + Send>>;
pub type ResourceHandler = Arc<dyn Fn(ToolContext, String) -> ResourceFuture + Send + Sync>;

pub struct RegisteredResource {
    pub uri: String,
    pub name: String,
    pub description: Option<String>,
    pub mime_type: Option<String>,
    pub handler: ResourceHandler,
}

pub type PromptResult = Result<Vec<PromptMessage>, McpError>;

/// Prompts are rendered synchronously; they may inspect the registry itself.
pub type PromptHandler =
    Arc<dyn Fn(&McpRegistry, &ToolContext, &Value) -> PromptResult + Send + Sync>;

pub struct RegisteredPrompt {
    pub name: String,
    pub description: String,
    pub handler: PromptHandler,
}

/// Tools are keyed by name; resources and prompts keep registration order.
pub struct McpRegistry {
    tools: HashMap<String, RegisteredTool>,
    resources: Vec<RegisteredResource>,
    prompts: Vec<RegisteredPrompt>,
}

impl McpRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            resources: Vec::new(),
            prompts: Vec::new(),
        }
    }

    pub fn register_tool(&mut self, tool: RegisteredTool) {
        self.tools.insert(tool.name.clone(), tool);
    }

    pub fn register_resource(&mut self, resource: RegisteredResource) {
        self.resources.push(resource);
    }

    pub fn register_prompt(&mut self, prompt: RegisteredPrompt) {
        self.prompts.push(prompt);
    }

    /// All tools, sorted by name
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        let mut tools: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|tool| ToolDefinition {
                name: tool.name.clone(),
                description: tool.description.clone(),
                input_schema: tool.input_schema.clone(),
            })
            .collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Tools of one category, sorted by name
    pub fn tools_in_category(&self, category: ToolCategory) -> Vec<&RegisteredTool> {
        let mut tools: Vec<&RegisteredTool> = self
            .tools
            .values()
            .filter(|tool| tool.category == category)
            .collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub fn get_tool(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    pub fn list_resources(&self) -> Vec<ResourceDefinition> {
        self.resources
            .iter()
            .map(|resource| ResourceDefinition {
                uri: resource.uri.clone(),
                name: resource.name.clone(),
                description: resource.description.clone(),
                mime_type: resource.mime_type.clone(),
            })
            .collect()
    }

    pub fn find_resource(&self, uri: &str) -> Option<&RegisteredResource> {
        self.resources.iter().find(|resource| resource.uri == uri)
    }

    pub fn list_prompts(&self) -> Vec<PromptDefinition> {
        self.prompts
            .iter()
            .map(|prompt| PromptDefinition {
                name: prompt.name.clone(),
                description: prompt.description.clone(),
            })
            .collect()
    }

    pub fn get_prompt(&self, name: &str) -> Option<&RegisteredPrompt> {
        self.prompts.iter().find(|prompt| prompt.name == name)
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.len()
    }
}

impl Default for McpRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Tools default to [`ToolCategory::Read`] with an empty object schema.
pub struct ToolBuilder {
    name: String,
    description: String,
    input_schema: Value,
    category: ToolCategory,
}

impl ToolBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
            category: ToolCategory::Read,
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn input_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    pub fn category(mut self, cat: ToolCategory) -> Self {
        self.category = cat;
        self
    }

    pub fn build<F, Fut>(self, handler: F) -> RegisteredTool
    where
        F: Fn(ToolContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult> + Send + 'static,
    {
        RegisteredTool {
            name: self.name,
            description: self.description,
            input_schema: self.input_schema,
            category: self.category,
            handler: Arc::new(move |ctx, params| Box::pin(handler(ctx, params))),
        }
    }
}

pub struct ResourceBuilder {
    uri: String,
    name: String,
    description: Option<String>,
    mime_type: Option<String>,
}

impl ResourceBuilder {
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            description: None,
            mime_type: None,
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn mime_type(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = Some(mime.into());
        self
    }

    pub fn build<F, Fut>(self, handler: F) -> RegisteredResource
    where
        F: Fn(ToolContext, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ResourceResult> + Send + 'static,
    {
        RegisteredResource {
            uri: self.uri,
            name: self.name,
            description: self.description,
            mime_type: self.mime_type,
            handler: Arc::new(move |ctx, uri| Box::pin(handler(ctx, uri))),
        }
    }
}

pub struct PromptBuilder {
    name: String,
    description: String,
}

impl PromptBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn build<F>(self, handler: F) -> RegisteredPrompt
    where
        F: Fn(&McpRegistry, &ToolContext, &Value) -> PromptResult + Send + Sync + 'static,
    {
        RegisteredPrompt {
            name: self.name,
            description: self.description,
            handler: Arc::new(handler),
        }
    }
}
