//! Core types and shared functionality for the УМЦ offline cache.
//!
//! This crate provides:
//! - Versioned response cache with SQLite and in-memory backends
//! - Request/response values shared by the cache and the network layer
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod resource;

pub use cache::{CacheDb, CacheStore, CachedEntry, MemoryStore};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use resource::{Request, RequestKey, Response};
