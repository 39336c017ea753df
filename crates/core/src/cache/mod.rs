//! Versioned response cache.
//!
//! Responses are grouped into named generations, one per deployed version.
//! Two backends implement [`CacheStore`]:
//!
//! - [`CacheDb`]: SQLite via tokio-rusqlite, WAL mode, automatic migrations
//! - [`MemoryStore`]: process-local, for tests and ephemeral hosts
//!
//! Entries never expire on their own; eviction happens only by deleting a
//! whole generation.

pub mod connection;
pub mod entries;
pub mod generations;
pub mod hash;
pub mod memory;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use memory::MemoryStore;
pub use store::{CacheStore, CachedEntry, GenerationInfo};
