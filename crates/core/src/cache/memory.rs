//! In-memory cache store.
//!
//! Backs ephemeral hosts and tests. Uses a tokio RwLock so readers never
//! block each other.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::store::{CacheStore, CachedEntry, ensure_storable};
use crate::Error;
use crate::resource::{RequestKey, Response};

type Generation = BTreeMap<RequestKey, CachedEntry>;

/// Cache store held entirely in process memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    generations: Arc<RwLock<BTreeMap<String, Generation>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn open_generation(&self, name: &str) -> Result<(), Error> {
        self.generations.write().await.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn generation_names(&self) -> Result<Vec<String>, Error> {
        Ok(self.generations.read().await.keys().cloned().collect())
    }

    async fn delete_generation(&self, name: &str) -> Result<bool, Error> {
        Ok(self.generations.write().await.remove(name).is_some())
    }

    async fn match_entry(&self, generation: &str, key: &RequestKey) -> Result<Option<CachedEntry>, Error> {
        let generations = self.generations.read().await;
        Ok(generations.get(generation).and_then(|g| g.get(key)).cloned())
    }

    async fn put_entry(&self, generation: &str, key: &RequestKey, response: &Response) -> Result<(), Error> {
        ensure_storable(key, response)?;
        let entry = CachedEntry {
            key: key.clone(),
            response: response.clone(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        };
        self.generations
            .write()
            .await
            .entry(generation.to_string())
            .or_default()
            .insert(key.clone(), entry);
        Ok(())
    }

    async fn put_entries(&self, generation: &str, entries: &[(RequestKey, Response)]) -> Result<(), Error> {
        for (key, response) in entries {
            ensure_storable(key, response)?;
        }

        let now = chrono::Utc::now().to_rfc3339();
        let mut generations = self.generations.write().await;
        let target = generations.entry(generation.to_string()).or_default();
        for (key, response) in entries {
            let entry = CachedEntry { key: key.clone(), response: response.clone(), stored_at: now.clone() };
            target.insert(key.clone(), entry);
        }
        Ok(())
    }

    async fn keys(&self, generation: &str) -> Result<Vec<RequestKey>, Error> {
        let generations = self.generations.read().await;
        Ok(generations
            .get(generation)
            .map(|g| g.keys().cloned().collect())
            .unwrap_or_default())
    }
}
