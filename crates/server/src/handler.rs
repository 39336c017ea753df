//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::{
    cache::{CacheGetParams, generations_impl, get_impl},
    lifecycle::{activate_impl, install_impl},
    resource_fetch::{ResourceFetchParams, fetch_impl},
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use umc_client::{OfflineCache, Transport};
use url::Url;

/// The main MCP server handler for umc-offline.
#[derive(Clone)]
pub struct UmcOfflineServer {
    tool_router: ToolRouter<Self>,
    cache: Arc<OfflineCache>,
    transport: Arc<dyn Transport>,
    origin: Url,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl UmcOfflineServer {
    /// Create a new server handler.
    pub fn new(cache: Arc<OfflineCache>, transport: Arc<dyn Transport>, origin: Url) -> Self {
        Self { tool_router: Self::tool_router(), cache, transport, origin }
    }

    /// Fetch a resource through the offline cache.
    #[tool(
        description = "Fetch a web app resource through the offline cache. Relative paths resolve against the app origin. Returns status, headers, body and whether it came from cache, network, or the offline fallback."
    )]
    async fn resource_fetch(&self, params: Parameters<ResourceFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.cache, self.transport.as_ref(), &self.origin, params.0).await
    }

    /// Re-run the install phase.
    #[tool(description = "Fetch and store every seed resource into the current cache generation (all-or-nothing).")]
    async fn cache_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.cache).await
    }

    /// Re-run the activate phase.
    #[tool(description = "Delete every cache generation except the current one and start intercepting requests.")]
    async fn cache_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.cache).await
    }

    /// Look up a stored response.
    #[tool(description = "Get the stored response for a URL from the current cache generation.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.cache, &self.origin, params.0).await
    }

    /// List generations.
    #[tool(description = "List cache generations with their entry counts and the current lifecycle state.")]
    async fn cache_generations(&self) -> Result<CallToolResult, McpError> {
        generations_impl(&self.cache).await
    }
}

impl ServerHandler for UmcOfflineServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "umc-offline".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{StaticTransport, host};

    #[test]
    fn test_lists_every_tool() {
        let (cache, transport, origin) = host(StaticTransport::default());
        let server = UmcOfflineServer::new(Arc::new(cache), transport, origin);

        let mut names = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect::<Vec<_>>();
        names.sort();

        assert_eq!(
            names,
            vec!["cache_activate", "cache_generations", "cache_get", "cache_install", "resource_fetch"]
        );
    }

    #[test]
    fn test_server_info() {
        let (cache, transport, origin) = host(StaticTransport::default());
        let server = UmcOfflineServer::new(Arc::new(cache), transport, origin);

        assert_eq!(server.get_info().server_info.name, "umc-offline");
    }
}
