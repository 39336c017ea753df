//! Entry CRUD operations.
//!
//! Provides reads and atomic writes of stored responses within a generation.

use super::connection::CacheDb;
use super::store::{CachedEntry, ensure_storable};
use crate::Error;
use crate::resource::{RequestKey, Response};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A stored response as laid out in the `entries` table.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key_hash: String,
    pub method: String,
    pub url: String,
    pub status: u16,
    pub headers_json: String,
    pub body: Vec<u8>,
}

impl CacheEntry {
    /// Build a row from a response, rejecting non-2xx statuses.
    pub fn new(key: &RequestKey, response: &Response) -> Result<Self, Error> {
        ensure_storable(key, response)?;
        let headers_json =
            serde_json::to_string(&response.headers).map_err(|e| Error::CorruptEntry(e.to_string()))?;
        Ok(Self {
            key_hash: key.hash(),
            method: key.method.clone(),
            url: key.url.clone(),
            status: response.status,
            headers_json,
            body: response.body.to_vec(),
        })
    }

    fn into_cached(self, stored_at: String) -> Result<CachedEntry, Error> {
        let headers: Vec<(String, String)> =
            serde_json::from_str(&self.headers_json).map_err(|e| Error::CorruptEntry(e.to_string()))?;
        Ok(CachedEntry {
            key: RequestKey { method: self.method, url: self.url },
            response: Response::new(self.status, headers, self.body),
            stored_at,
        })
    }
}

impl CacheDb {
    /// Insert or replace entries in one transaction.
    ///
    /// The generation is created if missing. Either every row is written
    /// or the table is left untouched.
    pub async fn upsert_entries(&self, generation: &str, entries: Vec<CacheEntry>) -> Result<(), Error> {
        let generation = generation.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO generations (name, created_at) VALUES (?1, ?2)",
                    params![&generation, &now],
                )?;
                for entry in &entries {
                    tx.execute(
                        "INSERT INTO entries (
                        generation, key_hash, method, url, status, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    ON CONFLICT(generation, key_hash) DO UPDATE SET
                        method = excluded.method,
                        url = excluded.url,
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                        params![
                            &generation,
                            &entry.key_hash,
                            &entry.method,
                            &entry.url,
                            entry.status,
                            &entry.headers_json,
                            &entry.body,
                            &now,
                        ],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get an entry by request key.
    ///
    /// Returns None if the generation has no entry for the key.
    pub async fn get_entry(&self, generation: &str, key: &RequestKey) -> Result<Option<CachedEntry>, Error> {
        let generation = generation.to_string();
        let key_hash = key.hash();
        self.conn
            .call(move |conn| -> Result<Option<CachedEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT key_hash, method, url, status, headers_json, body, stored_at
                FROM entries WHERE generation = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![generation, key_hash], |row| {
                    Ok((
                        CacheEntry {
                            key_hash: row.get(0)?,
                            method: row.get(1)?,
                            url: row.get(2)?,
                            status: row.get(3)?,
                            headers_json: row.get(4)?,
                            body: row.get(5)?,
                        },
                        row.get::<_, String>(6)?,
                    ))
                });

                match result {
                    Ok((entry, stored_at)) => entry.into_cached(stored_at).map(Some),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// List the keys stored in a generation, ordered by URL then method.
    pub async fn list_keys(&self, generation: &str) -> Result<Vec<RequestKey>, Error> {
        let generation = generation.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<RequestKey>, Error> {
                let mut stmt =
                    conn.prepare("SELECT method, url FROM entries WHERE generation = ?1 ORDER BY url, method")?;
                let keys = stmt
                    .query_map(params![generation], |row| Ok(RequestKey { method: row.get(0)?, url: row.get(1)? }))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }

    /// Count entries in a generation.
    pub async fn count_entries(&self, generation: &str) -> Result<u64, Error> {
        let generation = generation.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE generation = ?1", params![generation], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
