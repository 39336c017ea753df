//! Client-side offline caching for the УМЦ web app.
//!
//! This crate provides the HTTP transport and the offline resource cache
//! that decides, per request, whether to answer from the cache, the network,
//! or both.

pub mod fetch;
pub mod worker;

pub use fetch::{FetchClient, FetchConfig, Transport};
pub use worker::{CacheConfig, Intercept, Lifecycle, OfflineCache, Served, ServedFrom, Strategy, classify};
