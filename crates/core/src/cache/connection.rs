//! Database connection management with pragma configuration.
//!
//! This module handles opening the SQLite database, applying required pragmas
//! for performance and concurrency (WAL mode), and running migrations.

use super::migrations;
use super::entries::CacheEntry;
use super::store::{CacheStore, CachedEntry};
use crate::Error;
use crate::resource::{RequestKey, Response};
use async_trait::async_trait;
use std::path::Path;
use tokio_rusqlite::Connection;

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA temp_store=MEMORY;
     PRAGMA foreign_keys=ON;";

/// Cache database handle.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread.
#[derive(Clone, Debug)]
pub struct CacheDb {
    pub(crate) conn: Connection,
}

impl CacheDb {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies performance pragmas,
    /// and runs any pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        let db = Self::init(conn).await?;
        tracing::debug!(path = %path.display(), "opened cache database");
        Ok(db)
    }

    /// Open an in-memory database for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn).await?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheStore for CacheDb {
    async fn open_generation(&self, name: &str) -> Result<(), Error> {
        self.create_generation(name).await
    }

    async fn generation_names(&self) -> Result<Vec<String>, Error> {
        self.list_generations().await
    }

    async fn delete_generation(&self, name: &str) -> Result<bool, Error> {
        self.drop_generation(name).await
    }

    async fn match_entry(&self, generation: &str, key: &RequestKey) -> Result<Option<CachedEntry>, Error> {
        self.get_entry(generation, key).await
    }

    async fn put_entry(&self, generation: &str, key: &RequestKey, response: &Response) -> Result<(), Error> {
        self.upsert_entries(generation, vec![CacheEntry::new(key, response)?]).await
    }

    async fn put_entries(&self, generation: &str, entries: &[(RequestKey, Response)]) -> Result<(), Error> {
        let rows = entries
            .iter()
            .map(|(key, response)| CacheEntry::new(key, response))
            .collect::<Result<Vec<_>, _>>()?;
        self.upsert_entries(generation, rows).await
    }

    async fn keys(&self, generation: &str) -> Result<Vec<RequestKey>, Error> {
        self.list_keys(generation).await
    }

    async fn entry_count(&self, generation: &str) -> Result<u64, Error> {
        self.count_entries(generation).await
    }
}
