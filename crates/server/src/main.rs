//! umc-offline server entry point.
//!
//! Boots the offline cache (install, then activate) and serves it as an MCP server on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;
use umc_client::{CacheConfig, FetchClient, FetchConfig, OfflineCache, Transport};
use umc_core::{AppConfig, CacheDb};
use url::Url;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(cache = %config.cache_name, origin = %config.origin, db = %config.db_path.display(), "Starting umc-offline server on stdio transport");

    let origin = Url::parse(&config.origin)?;
    let store = Arc::new(CacheDb::open(&config.db_path).await?);
    let transport: Arc<dyn Transport> = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let cache = Arc::new(OfflineCache::new(CacheConfig::try_from(&config)?, store, transport.clone()));

    // Until an install succeeds every request passes through to the network; cache_install retries it.
    match cache.on_install().await {
        Ok(()) => {
            let deleted = cache.on_activate().await?;
            tracing::info!(deleted = ?deleted, "Activated");
        }
        Err(e) => tracing::error!(error = %e, "Install failed; cache stays inactive"),
    }

    let handler = handler::UmcOfflineServer::new(cache, transport, origin);
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;

    Ok(())
}
