//! Scripted transport and store doubles for worker tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use umc_core::cache::{CachedEntry, GenerationInfo};
use umc_core::{AppConfig, CacheStore, Error, MemoryStore, Request, RequestKey, Response};
use url::Url;

use super::{CacheConfig, OfflineCache};
use crate::fetch::Transport;

pub const ORIGIN: &str = "http://app.test";

pub fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

pub fn app_config(seeds: &[&str]) -> AppConfig {
    AppConfig {
        origin: ORIGIN.into(),
        seed_manifest: seeds.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

pub fn cache_with(config: AppConfig, store: MemoryStore) -> (OfflineCache, MemoryStore, Arc<MockTransport>) {
    let transport = Arc::new(MockTransport::default());
    let cache = OfflineCache::new(
        CacheConfig::try_from(&config).unwrap(),
        Arc::new(store.clone()),
        transport.clone(),
    );
    (cache, store, transport)
}

/// An installed and activated cache with an empty manifest.
pub async fn active_cache() -> (OfflineCache, MemoryStore, Arc<MockTransport>) {
    let (cache, store, transport) = cache_with(app_config(&[]), MemoryStore::new());
    cache.on_install().await.unwrap();
    cache.on_activate().await.unwrap();
    (cache, store, transport)
}

#[derive(Clone)]
enum Route {
    Respond(Response),
    Fail,
    TimeOut,
    Reject,
    Hang,
}

/// Transport answering from a fixed route table. Unknown URLs fail.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn respond(&self, url: &str, status: u16, body: &str) {
        let response = Response::new(status, vec![("content-type".into(), "text/plain".into())], body.to_string());
        self.routes.lock().unwrap().insert(url.to_string(), Route::Respond(response));
    }

    pub fn fail(&self, url: &str) {
        self.routes.lock().unwrap().insert(url.to_string(), Route::Fail);
    }

    /// Answer with `FETCH_TIMEOUT`, as the real client does once its deadline passes.
    pub fn time_out(&self, url: &str) {
        self.routes.lock().unwrap().insert(url.to_string(), Route::TimeOut);
    }

    /// Answer with an error outside the network family.
    pub fn reject(&self, url: &str) {
        self.routes.lock().unwrap().insert(url.to_string(), Route::Reject);
    }

    /// Never answer.
    pub fn hang(&self, url: &str) {
        self.routes.lock().unwrap().insert(url.to_string(), Route::Hang);
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let url = request.url.to_string();
        self.calls.lock().unwrap().push(url.clone());
        let route = self.routes.lock().unwrap().get(&url).cloned();
        match route {
            Some(Route::Respond(response)) => Ok(response),
            Some(Route::Fail) | None => Err(Error::Network(format!("unreachable: {url}"))),
            Some(Route::TimeOut) => Err(Error::FetchTimeout(format!("no response from {url}"))),
            Some(Route::Reject) => Err(Error::InvalidInput(format!("cannot fetch {url}"))),
            Some(Route::Hang) => std::future::pending().await,
        }
    }
}

/// Store whose entry reads and writes always fail.
pub struct BrokenStore;

#[async_trait]
impl CacheStore for BrokenStore {
    async fn open_generation(&self, _name: &str) -> Result<(), Error> {
        Ok(())
    }

    async fn generation_names(&self) -> Result<Vec<String>, Error> {
        Ok(Vec::new())
    }

    async fn delete_generation(&self, _name: &str) -> Result<bool, Error> {
        Ok(false)
    }

    async fn match_entry(&self, _generation: &str, _key: &RequestKey) -> Result<Option<CachedEntry>, Error> {
        Err(Error::CorruptEntry("store unavailable".into()))
    }

    async fn put_entry(&self, _generation: &str, _key: &RequestKey, _response: &Response) -> Result<(), Error> {
        Err(Error::CorruptEntry("quota exceeded".into()))
    }

    async fn put_entries(&self, _generation: &str, _entries: &[(RequestKey, Response)]) -> Result<(), Error> {
        Ok(())
    }

    async fn keys(&self, _generation: &str) -> Result<Vec<RequestKey>, Error> {
        Ok(Vec::new())
    }

    async fn generations(&self) -> Result<Vec<GenerationInfo>, Error> {
        Ok(Vec::new())
    }
}
