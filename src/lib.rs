//! compcache - A bounded in-process cache
//!
//! Compresses large payloads, expires entries by TTL, evicts by size-aware
//! LRU, and reports its own health. Ships with a small HTTP server.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{Cache, CacheConfig};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;
