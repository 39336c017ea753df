//! Storage abstraction over versioned cache generations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::resource::{RequestKey, Response};

/// A stored response together with its key and write time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry {
    pub key: RequestKey,
    pub response: Response,
    /// RFC 3339 timestamp of the write.
    pub stored_at: String,
}

/// Name and size of one generation, as reported to hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GenerationInfo {
    pub name: String,
    pub entries: u64,
}

/// Persistent store of named cache generations.
///
/// Implementations must be safe for concurrent reads and tolerate overlapping
/// writes: every write fully replaces a single entry (last writer wins).
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Create the generation if it does not exist yet.
    async fn open_generation(&self, name: &str) -> Result<(), Error>;

    /// Names of every generation currently present.
    async fn generation_names(&self) -> Result<Vec<String>, Error>;

    /// Delete a generation and all of its entries.
    ///
    /// Returns false if no generation had that name.
    async fn delete_generation(&self, name: &str) -> Result<bool, Error>;

    /// Look up a request in one generation.
    async fn match_entry(&self, generation: &str, key: &RequestKey) -> Result<Option<CachedEntry>, Error>;

    /// Store one response, replacing any previous entry for the key.
    ///
    /// Opens the generation implicitly. Non-2xx responses are rejected.
    async fn put_entry(&self, generation: &str, key: &RequestKey, response: &Response) -> Result<(), Error>;

    /// Store a batch of responses atomically: either all are written or none.
    async fn put_entries(&self, generation: &str, entries: &[(RequestKey, Response)]) -> Result<(), Error>;

    /// Keys of every entry in a generation, sorted by URL then method.
    async fn keys(&self, generation: &str) -> Result<Vec<RequestKey>, Error>;

    /// Number of entries in a generation.
    async fn entry_count(&self, generation: &str) -> Result<u64, Error> {
        Ok(self.keys(generation).await?.len() as u64)
    }

    /// Every generation with its entry count.
    async fn generations(&self) -> Result<Vec<GenerationInfo>, Error> {
        let mut infos = Vec::new();
        for name in self.generation_names().await? {
            let entries = self.entry_count(&name).await?;
            infos.push(GenerationInfo { name, entries });
        }
        Ok(infos)
    }
}

/// Reject responses that must never be written.
pub(crate) fn ensure_storable(key: &RequestKey, response: &Response) -> Result<(), Error> {
    if response.is_success() {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "refusing to cache {key}: status {} is not successful",
            response.status
        )))
    }
}
