//! MCP bridge over stdio.
//!
//! Adapts the [`ToolRegistry`] to the MCP JSON-RPC protocol so agent hosts
//! can spawn `web2api serve mcp` and call the feed tools directly.
//!
//! * `list_tools` returns every registered tool with its input schema.
//! * `call_tool` runs the tool with [`LimitPolicy::AGENT`], so `limit` is
//!   clamped into `[1, 50]`. A fetch failure or invalid argument comes back
//!   as a tool error result rather than a protocol error.

use std::borrow::Cow;
use std::sync::Arc;

use rmcp::model::*;
use rmcp::transport::stdio;
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt};

use crate::limit::LimitPolicy;
use crate::traits::{ErrorEnvelope, ToolContext, ToolOutcome, ToolRegistry};

/// Bridges the tool registry to MCP.
///
/// Cloned per session; everything is behind `Arc`.
#[derive(Clone)]
pub struct McpBridge {
    tools: Arc<ToolRegistry>,
    ctx: ToolContext,
}

impl McpBridge {
    pub fn new(tools: Arc<ToolRegistry>, ctx: &ToolContext) -> Self {
        Self {
            tools,
            ctx: ctx.with_limits(LimitPolicy::AGENT),
        }
    }

    /// Convert a registry tool into an rmcp `Tool` descriptor.
    fn to_mcp_tool(tool: &dyn crate::traits::Tool) -> Tool {
        let input_schema: Arc<serde_json::Map<String, serde_json::Value>> =
            match tool.parameters_schema() {
                serde_json::Value::Object(map) => Arc::new(map),
                _ => Arc::new(serde_json::Map::new()),
            };

        Tool {
            name: Cow::Owned(tool.name().to_string()),
            title: None,
            description: Some(Cow::Owned(tool.description().to_string())),
            input_schema,
            output_schema: None,
            annotations: Some(ToolAnnotations::new().read_only(true)),
            execution: None,
            icons: None,
            meta: None,
        }
    }
}

/// Flatten an envelope into the single line shown to agents.
pub fn envelope_text(envelope: &ErrorEnvelope) -> String {
    match &envelope.details {
        Some(details) => format!("{}. {}", envelope.error, details),
        None => envelope.error.clone(),
    }
}

impl ServerHandler for McpBridge {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "web2api".to_string(),
                title: Some("web2api".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Top items from Hacker News, Product Hunt, and Reddit as normalized JSON. \
                 Use get_feed with a source, or the per-source tools. limit is capped at 50."
                    .to_string(),
            ),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools: Vec<Tool> = self
            .tools
            .tools()
            .iter()
            .map(|t| Self::to_mcp_tool(t.as_ref()))
            .collect();
        std::future::ready(Ok(ListToolsResult::with_all_items(tools)))
    }

    fn get_tool(&self, name: &str) -> Option<Tool> {
        self.tools.find(name).map(Self::to_mcp_tool)
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool = self.tools.find(&request.name).ok_or_else(|| {
            McpError::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("no tool registered with name: {}", request.name),
                None,
            )
        })?;

        let params = request
            .arguments
            .map(serde_json::Value::Object)
            .unwrap_or(serde_json::Value::Object(serde_json::Map::new()));

        match tool.execute(params, &self.ctx).await {
            Ok(ToolOutcome::Items(items)) => {
                let text = serde_json::to_string_pretty(&items).unwrap_or_default();
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Ok(ToolOutcome::Error(envelope)) => Ok(CallToolResult::error(vec![Content::text(
                envelope_text(&envelope),
            )])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        }
    }
}

/// Serve MCP on stdin/stdout until the client disconnects.
pub async fn serve_stdio(bridge: McpBridge) -> anyhow::Result<()> {
    tracing::info!(tools = bridge.tools.len(), "serving MCP on stdio");
    let running = bridge.serve(stdio()).await?;
    running.waiting().await?;
    Ok(())
}
