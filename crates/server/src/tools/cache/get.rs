//! cache_get tool implementation.
//!
//! Retrieves a stored response from the current generation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use umc_client::OfflineCache;
use umc_client::fetch::resolve;
use umc_core::{CacheStore, Error, Request};
use url::Url;

use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Absolute URL, or a path relative to the app origin.
    pub url: String,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub generation: String,
    pub method: String,
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    pub body_bytes: usize,
    /// RFC 3339 timestamp of the write.
    pub stored_at: String,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(cache: &OfflineCache, origin: &Url, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let url = resolve(origin, &params.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let key = Request::get(url).key();

    let entry = cache
        .store()
        .match_entry(cache.cache_name(), &key)
        .await?
        .ok_or_else(|| Error::CacheMiss(key.to_string()))?;

    json_result(&CacheGetOutput {
        generation: cache.cache_name().to_string(),
        method: entry.key.method,
        url: entry.key.url,
        status: entry.response.status,
        body: entry.response.text(),
        body_bytes: entry.response.body.len(),
        headers: entry.response.headers,
        stored_at: entry.stored_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{StaticTransport, active_host, host, parse_output};

    #[tokio::test]
    async fn test_get_impl_missing() {
        let (cache, _transport, origin) = active_host(StaticTransport::default()).await;
        let params = CacheGetParams { url: "/nonexistent.css".to_string() };

        let err = get_impl(&cache, &origin, params).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }

    #[tokio::test]
    async fn test_get_impl_invalid_url() {
        let (cache, _transport, origin) = active_host(StaticTransport::default()).await;
        let params = CacheGetParams { url: "ftp://files.example/a.css".to_string() };

        let err = get_impl(&cache, &origin, params).await.unwrap_err();
        assert_eq!(err.code.0, -32003);
    }

    #[tokio::test]
    async fn test_get_impl_found_after_install() {
        let transport = StaticTransport::default()
            .with("http://app.test/", 200, "index")
            .with("http://app.test/a.css", 200, "body{}");
        let (cache, _transport, origin) = host(transport);
        cache.on_install().await.unwrap();

        let result = get_impl(&cache, &origin, CacheGetParams { url: "/a.css".into() }).await.unwrap();
        let output: CacheGetOutput = parse_output(&result);

        assert_eq!(output.generation, "umc-webapp-v2");
        assert_eq!(output.method, "GET");
        assert_eq!(output.url, "http://app.test/a.css");
        assert_eq!(output.status, 200);
        assert_eq!(output.body, "body{}");
    }
}
