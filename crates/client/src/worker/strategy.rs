//! The three fetch strategies.
//!
//! Each strategy recovers from network failures locally: it falls back to the
//! cache or to the synthetic offline response. Store failures degrade to
//! network-only behaviour and are logged, never returned.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use umc_core::{CacheStore, Error, Request, Response};

use super::classify::Strategy;
use crate::fetch::Transport;

/// Where a response handed back to the host came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ServedFrom {
    Cache,
    Network,
    /// The synthetic 503 "Offline" response.
    Offline,
}

/// A response together with how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub response: Response,
    pub source: ServedFrom,
    pub strategy: Strategy,
}

/// Everything a strategy needs: the store, the transport and the current generation.
#[derive(Clone)]
pub(crate) struct StrategyContext {
    pub store: Arc<dyn CacheStore>,
    pub transport: Arc<dyn Transport>,
    pub generation: Arc<str>,
}

impl StrategyContext {
    pub async fn run(&self, strategy: Strategy, request: Request) -> Served {
        let (response, source) = match strategy {
            Strategy::CacheFirst => self.cache_first(&request).await,
            Strategy::NetworkFirst => self.network_first(&request).await,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(request).await,
        };
        Served { response, source, strategy }
    }

    async fn cache_first(&self, request: &Request) -> (Response, ServedFrom) {
        if let Some(cached) = self.lookup(request).await {
            return (cached, ServedFrom::Cache);
        }

        match self.fetch_and_store(request).await {
            Ok(response) => (response, ServedFrom::Network),
            Err(e) => {
                log_fetch_failure(request, Strategy::CacheFirst, &e);
                (Response::offline(), ServedFrom::Offline)
            }
        }
    }

    async fn network_first(&self, request: &Request) -> (Response, ServedFrom) {
        match self.fetch_and_store(request).await {
            Ok(response) => (response, ServedFrom::Network),
            Err(e) => {
                log_fetch_failure(request, Strategy::NetworkFirst, &e);
                match self.lookup(request).await {
                    Some(cached) => (cached, ServedFrom::Cache),
                    None => (Response::offline(), ServedFrom::Offline),
                }
            }
        }
    }

    async fn stale_while_revalidate(&self, request: Request) -> (Response, ServedFrom) {
        let stale = self.lookup(&request).await;

        let ctx = self.clone();
        let url = request.url.clone();
        let revalidation = tokio::spawn(async move {
            let result = ctx.fetch_and_store(&request).await;
            if let Err(e) = &result {
                log_fetch_failure(&request, Strategy::StaleWhileRevalidate, e);
            }
            result
        });

        if let Some(cached) = stale {
            return (cached, ServedFrom::Cache);
        }

        match revalidation.await {
            Ok(Ok(response)) => (response, ServedFrom::Network),
            Ok(Err(_)) => (Response::offline(), ServedFrom::Offline),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "revalidation task aborted");
                (Response::offline(), ServedFrom::Offline)
            }
        }
    }

    /// Fetch from the network; store 2xx responses before handing them back.
    ///
    /// Non-2xx responses are returned uncached. Only transport failures are errors.
    async fn fetch_and_store(&self, request: &Request) -> Result<Response, Error> {
        let response = self.transport.fetch(request).await?;
        if response.is_success() {
            self.store_copy(request, &response).await;
        }
        Ok(response)
    }

    async fn lookup(&self, request: &Request) -> Option<Response> {
        match self.store.match_entry(&self.generation, &request.key()).await {
            Ok(entry) => entry.map(|e| e.response),
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "cache lookup failed, treating as miss");
                None
            }
        }
    }

    async fn store_copy(&self, request: &Request, response: &Response) {
        if let Err(e) = self.store.put_entry(&self.generation, &request.key(), response).await {
            tracing::warn!(url = %request.url, error = %e, "failed to store response");
        }
    }
}

fn log_fetch_failure(request: &Request, strategy: Strategy, error: &Error) {
    if error.is_network() {
        tracing::debug!(url = %request.url, %strategy, error = %error, "fetch failed");
    } else {
        tracing::warn!(url = %request.url, %strategy, error = %error, "transport returned an unexpected error");
    }
}
