//! Cache inspection tools.
//!
//! This module provides read-only views of the cache store.

pub mod generations;
pub mod get;

pub use generations::{CacheGenerationsOutput, generations_impl};
pub use get::{CacheGetParams, get_impl};
