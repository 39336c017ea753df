//! MCP tool implementations.
//!
//! This module contains all tools exposed by the umc-offline server.

pub mod cache;
pub mod lifecycle;
pub mod resource_fetch;

pub use resource_fetch::{ResourceFetchOutput, ResourceFetchParams};

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::ToolError;

/// Serialize a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(|e| ToolError::Serialize(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use rmcp::model::CallToolResult;
    use serde::de::DeserializeOwned;
    use umc_client::{CacheConfig, OfflineCache, Transport};
    use umc_core::{AppConfig, Error, MemoryStore, Request, Response};
    use url::Url;

    /// Transport answering from a fixed table; unknown URLs are unreachable.
    #[derive(Default)]
    pub struct StaticTransport {
        routes: HashMap<String, (u16, String)>,
    }

    impl StaticTransport {
        pub fn with(mut self, url: &str, status: u16, body: &str) -> Self {
            self.routes.insert(url.to_string(), (status, body.to_string()));
            self
        }
    }

    #[async_trait]
    impl Transport for StaticTransport {
        async fn fetch(&self, request: &Request) -> Result<Response, Error> {
            match self.routes.get(request.url.as_str()) {
                Some((status, body)) => Ok(Response::new(*status, vec![], body.clone())),
                None => Err(Error::Network(format!("unreachable: {}", request.url))),
            }
        }
    }

    fn build(seeds: &[&str], transport: StaticTransport) -> (OfflineCache, Arc<StaticTransport>, Url) {
        let config = AppConfig {
            origin: "http://app.test".into(),
            seed_manifest: seeds.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };
        let origin = Url::parse(&config.origin).unwrap();
        let transport = Arc::new(transport);
        let cache = OfflineCache::new(
            CacheConfig::try_from(&config).unwrap(),
            Arc::new(MemoryStore::new()),
            transport.clone(),
        );
        (cache, transport, origin)
    }

    /// A fresh cache whose manifest is `/` and `/a.css`.
    pub fn host(transport: StaticTransport) -> (OfflineCache, Arc<StaticTransport>, Url) {
        build(&["/", "/a.css"], transport)
    }

    /// An installed and activated cache with an empty manifest.
    pub async fn active_host(transport: StaticTransport) -> (OfflineCache, Arc<StaticTransport>, Url) {
        let (cache, transport, origin) = build(&[], transport);
        cache.on_install().await.unwrap();
        cache.on_activate().await.unwrap();
        (cache, transport, origin)
    }

    pub fn parse_output<T: DeserializeOwned>(result: &CallToolResult) -> T {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }
}
