//! cache_install and cache_activate tool implementations.
//!
//! Let the host re-run a lifecycle phase, e.g. after a failed install at startup.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use umc_client::{Lifecycle, OfflineCache};
use umc_core::CacheStore;

use super::json_result;

/// Output from the cache_install and cache_activate tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LifecycleOutput {
    /// Name of the current generation.
    pub cache_name: String,
    /// Lifecycle state after the phase ran.
    pub state: Lifecycle,
    /// Number of seed resources stored (install only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<u64>,
    /// Generations deleted (activate only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<Vec<String>>,
}

/// Implementation of the cache_install tool.
pub async fn install_impl(cache: &OfflineCache) -> Result<CallToolResult, McpError> {
    cache.on_install().await?;
    let resources = cache.store().entry_count(cache.cache_name()).await?;

    json_result(&LifecycleOutput {
        cache_name: cache.cache_name().to_string(),
        state: cache.state().await,
        resources: Some(resources),
        deleted: None,
    })
}

/// Implementation of the cache_activate tool.
pub async fn activate_impl(cache: &OfflineCache) -> Result<CallToolResult, McpError> {
    let deleted = cache.on_activate().await?;

    json_result(&LifecycleOutput {
        cache_name: cache.cache_name().to_string(),
        state: cache.state().await,
        resources: None,
        deleted: Some(deleted),
    })
}
