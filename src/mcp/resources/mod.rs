//! MCP Resources
//!
//! Static JSON templates and references, embedded in the binary.

use super::context::ToolContext;
use super::protocol::{McpError, ResourceContent};
use super::registry::{McpRegistry, RegisteredResource, ResourceBuilder, ResourceResult};

const JSON_MIME: &str = "application/json";

struct StaticResource {
    file_name: &'static str,
    description: &'static str,
    body: &'static str,
    /// Substitute `{{partition}}` and `{{domain}}` before returning
    templated: bool,
}

const RESOURCES: [StaticResource; 4] = [
    StaticResource {
        file_name: "legal-tag-template.json",
        description: "Working legal tag template structure",
        body: include_str!("assets/legal-tag-template.json"),
        templated: false,
    },
    StaticResource {
        file_name: "processing-parameter-record.json",
        description: "Complete record template for ProcessingParameterType",
        body: include_str!("assets/processing-parameter-record.json"),
        templated: false,
    },
    StaticResource {
        file_name: "acl-format-examples.json",
        description: "ACL format examples for different OSDU environments",
        body: include_str!("assets/acl-format-examples.json"),
        templated: true,
    },
    StaticResource {
        file_name: "search-query-patterns.json",
        description: "Proven search query patterns for record validation",
        body: include_str!("assets/search-query-patterns.json"),
        templated: false,
    },
];

/// Register all resources with the registry
pub fn register_all_resources(registry: &mut McpRegistry) {
    for (index, resource) in RESOURCES.iter().enumerate() {
        registry.register_resource(static_resource(index, resource));
    }
}

fn static_resource(index: usize, resource: &StaticResource) -> RegisteredResource {
    ResourceBuilder::new(format!("file://{}", resource.file_name), resource.file_name)
        .description(resource.description)
        .mime_type(JSON_MIME)
        .build(move |ctx, uri| async move { read_static(index, &ctx, uri) })
}

fn read_static(index: usize, ctx: &ToolContext, uri: String) -> ResourceResult {
    let resource = RESOURCES
        .get(index)
        .ok_or_else(|| McpError::ResourceNotFound(uri.clone()))?;

    let text = if resource.templated {
        render(resource.body, &ctx.config.data_partition, &ctx.config.domain)
    } else {
        resource.body.to_string()
    };

    Ok(vec![ResourceContent {
        uri,
        mime_type: Some(JSON_MIME.to_string()),
        text,
    }])
}

fn render(body: &str, partition: &str, domain: &str) -> String {
    body.replace("{{partition}}", partition)
        .replace("{{domain}}", domain)
}
