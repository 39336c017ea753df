//! cache_generations tool implementation.
//!
//! Lists every generation in the store with its entry count.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use umc_client::{Lifecycle, OfflineCache};
use umc_core::CacheStore;
use umc_core::cache::GenerationInfo;

use crate::tools::json_result;

/// Output from the cache_generations tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGenerationsOutput {
    /// Name of the generation this version reads and writes.
    pub current: String,
    pub state: Lifecycle,
    pub generations: Vec<GenerationInfo>,
}

/// Implementation of the cache_generations tool.
pub async fn generations_impl(cache: &OfflineCache) -> Result<CallToolResult, McpError> {
    let generations = cache.store().generations().await?;

    json_result(&CacheGenerationsOutput {
        current: cache.cache_name().to_string(),
        state: cache.state().await,
        generations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{StaticTransport, host, parse_output};
    use umc_core::{Request, Response};

    #[tokio::test]
    async fn test_generations_before_and_after_activation() {
        let transport = StaticTransport::default()
            .with("http://app.test/", 200, "index")
            .with("http://app.test/a.css", 200, "body{}");
        let (cache, _transport, _origin) = host(transport);

        let old_key = Request::get(url::Url::parse("http://app.test/a.css").unwrap()).key();
        cache
            .store()
            .put_entry("umc-webapp-v1", &old_key, &Response::new(200, vec![], "old"))
            .await
            .unwrap();
        cache.on_install().await.unwrap();

        let before: CacheGenerationsOutput = parse_output(&generations_impl(&cache).await.unwrap());
        assert_eq!(before.current, "umc-webapp-v2");
        assert_eq!(before.state, Lifecycle::Installed);
        assert_eq!(before.generations.len(), 2);

        cache.on_activate().await.unwrap();

        let after: CacheGenerationsOutput = parse_output(&generations_impl(&cache).await.unwrap());
        assert_eq!(after.state, Lifecycle::Activated);
        assert_eq!(after.generations, vec![GenerationInfo { name: "umc-webapp-v2".into(), entries: 2 }]);
    }
}
