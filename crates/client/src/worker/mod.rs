//! Offline resource cache.
//!
//! Intercepts GET requests issued by the web app and answers them from a
//! versioned cache generation, the network, or both:
//!
//! | request                                  | strategy                |
//! |------------------------------------------|-------------------------|
//! | `/`, `*.html`, `*.htm`                   | network-first           |
//! | `*.css`, `*.js`, `*.mjs`                 | cache-first             |
//! | any path on a configured CDN host        | stale-while-revalidate  |
//! | everything else                          | network-first           |
//!
//! The host drives three entry points: [`OfflineCache::on_install`] once per
//! deployed version, [`OfflineCache::on_activate`] when that version takes
//! over, and [`OfflineCache::on_request`] for every outgoing request.

pub mod classify;
mod lifecycle;
mod strategy;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use umc_core::{AppConfig, CacheStore, Error, Request};
use url::Url;

pub use classify::{Strategy, classify};
pub use lifecycle::Lifecycle;
pub use strategy::{Served, ServedFrom};

use crate::fetch::{Transport, resolve};
use strategy::StrategyContext;

/// Resolved settings for one deployed version.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Name of the current generation.
    pub cache_name: String,
    /// Seed resources fetched during install, in order.
    pub seed_manifest: Vec<Url>,
    /// Hosts served stale-while-revalidate.
    pub cdn_hosts: Vec<String>,
}

impl TryFrom<&AppConfig> for CacheConfig {
    type Error = Error;

    fn try_from(config: &AppConfig) -> Result<Self, Self::Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.origin)))?;
        let seed_manifest = config
            .seed_manifest
            .iter()
            .map(|entry| resolve(&origin, entry).map_err(|e| Error::InvalidUrl(format!("{entry}: {e}"))))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            cache_name: config.cache_name.clone(),
            seed_manifest,
            cdn_hosts: config.cdn_hosts.iter().map(|h| h.to_ascii_lowercase()).collect(),
        })
    }
}

/// Outcome of intercepting a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intercept {
    /// Not handled; the host performs the request as if no cache existed.
    PassThrough(Request),
    /// Answered by the cache layer.
    Respond(Served),
}

/// The offline cache for one deployed version.
pub struct OfflineCache {
    config: CacheConfig,
    ctx: StrategyContext,
    state: RwLock<Lifecycle>,
    /// Serializes install and activate.
    phase: Mutex<()>,
}

impl OfflineCache {
    pub fn new(config: CacheConfig, store: Arc<dyn CacheStore>, transport: Arc<dyn Transport>) -> Self {
        let ctx = StrategyContext { store, transport, generation: Arc::from(config.cache_name.as_str()) };
        Self { config, ctx, state: RwLock::new(Lifecycle::Parsed), phase: Mutex::new(()) }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Name of the generation this version reads and writes.
    pub fn cache_name(&self) -> &str {
        &self.config.cache_name
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.ctx.store
    }

    pub async fn state(&self) -> Lifecycle {
        *self.state.read().await
    }

    /// Strategy this cache would use for a URL.
    pub fn strategy_for(&self, url: &Url) -> Strategy {
        classify(url, &self.config.cdn_hosts)
    }

    /// Handle an outgoing request.
    ///
    /// Non-GET requests, and every request before activation, pass through
    /// without touching the store.
    pub async fn on_request(&self, request: Request) -> Intercept {
        if !request.is_get() {
            tracing::trace!(method = %request.method, url = %request.url, "passing through non-GET request");
            return Intercept::PassThrough(request);
        }

        if self.state().await != Lifecycle::Activated {
            tracing::trace!(url = %request.url, "cache not active, passing through");
            return Intercept::PassThrough(request);
        }

        let strategy = self.strategy_for(&request.url);
        let url = request.url.clone();
        let served = self.ctx.run(strategy, request).await;

        tracing::debug!(
            url = %url,
            strategy = %served.strategy,
            source = ?served.source,
            status = served.response.status,
            "served request"
        );

        Intercept::Respond(served)
    }
}
