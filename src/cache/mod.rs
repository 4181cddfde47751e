//! Cache Module
//!
//! Bounded in-process cache with compression, TTL expiry, size-aware LRU
//! eviction and self-reported health.

pub mod codec;
mod config;
pub mod diagnostics;
mod entry;
pub mod expiry;
mod facade;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use codec::Codec;
pub use config::CacheConfig;
pub use diagnostics::{HealthReport, HealthStatus, HealthThresholds};
pub use entry::CacheEntry;
pub use facade::{Cache, CacheReport, MgetItem, PerformanceMetrics};
pub use lru::LruTracker;
pub use stats::{CacheStats, Operation, PerformanceLogEntry, ResponseTimes, StatsCollector};
pub use store::{CacheStore, InsertOutcome, Lookup, StoreSnapshot, TopKey};

// == Public Constants ==
/// Maximum allowed key length in bytes on the HTTP surface
pub const MAX_KEY_LENGTH: usize = 256;
