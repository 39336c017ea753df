//! resource_fetch tool implementation.
//!
//! Issues a request through the offline cache, the way the web app would.
//! Requests the cache does not intercept go straight to the network.

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use umc_client::fetch::resolve;
use umc_client::{Intercept, OfflineCache, ServedFrom, Strategy, Transport};
use umc_core::{Error, Request};
use url::Url;

use super::json_result;

/// Input parameters for resource_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResourceFetchParams {
    /// Absolute URL, or a path relative to the app origin (e.g. "/enhanced-app.js").
    pub url: String,

    /// HTTP method (default: GET). Only GET requests are cached.
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for resource_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResourceFetchOutput {
    /// The resolved request URL.
    pub url: String,
    pub method: String,
    pub status: u16,
    /// Where the response came from; absent when the request bypassed the cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub served_from: Option<ServedFrom>,
    /// Strategy applied; absent when the request bypassed the cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    pub body_bytes: usize,
}

/// Implementation of the resource_fetch tool.
pub async fn fetch_impl(
    cache: &OfflineCache, transport: &dyn Transport, origin: &Url, params: ResourceFetchParams,
) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }
    if params.method.trim().is_empty() || !params.method.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::InvalidInput(format!("invalid method: {:?}", params.method)).into());
    }

    let url = resolve(origin, &params.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let resolved = url.to_string();
    let method = params.method.to_ascii_uppercase();
    let request = Request::new(method.clone(), url);

    let output = match cache.on_request(request).await {
        Intercept::Respond(served) => ResourceFetchOutput {
            url: resolved,
            method,
            status: served.response.status,
            served_from: Some(served.source),
            strategy: Some(served.strategy),
            headers: served.response.headers.clone(),
            body: served.response.text(),
            body_bytes: served.response.body.len(),
        },
        Intercept::PassThrough(request) => {
            tracing::debug!(method = %request.method, url = %request.url, "fetching without cache");
            let response = transport.fetch(&request).await?;
            ResourceFetchOutput {
                url: request.url.to_string(),
                method: request.method.clone(),
                status: response.status,
                served_from: None,
                strategy: None,
                headers: response.headers.clone(),
                body: response.text(),
                body_bytes: response.body.len(),
            }
        }
    };

    json_result(&output)
}
