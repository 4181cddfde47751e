//! Cache construction parameters.

use std::time::Duration;

use crate::cache::codec::DEFAULT_COMPRESSION_THRESHOLD;
use crate::cache::stats::{DEFAULT_LOG_CAPACITY, DEFAULT_RESPONSE_TIME_WINDOW};
use crate::cache::HealthThresholds;

/// Everything a [`Cache`](crate::cache::Cache) is built from.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of live entries
    pub max_entries: usize,
    /// Maximum total stored payload size in bytes
    pub max_total_size: usize,
    /// TTL applied when `set` is given none
    pub default_ttl: Duration,
    /// Payloads larger than this many bytes are compressed
    pub compression_threshold: usize,
    /// Timing log length before it is trimmed to half
    pub performance_log_capacity: usize,
    /// Number of recent operations averaged for response times
    pub response_time_window: usize,
    /// Length of the top-keys report
    pub top_keys: usize,
    /// Keys longer than this are elided in the top-keys report
    pub key_display_length: usize,
    /// Limits the health check compares the stats against
    pub health: HealthThresholds,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            max_total_size: 100 * 1024 * 1024,
            default_ttl: Duration::from_secs(300),
            compression_threshold: DEFAULT_COMPRESSION_THRESHOLD,
            performance_log_capacity: DEFAULT_LOG_CAPACITY,
            response_time_window: DEFAULT_RESPONSE_TIME_WINDOW,
            top_keys: 10,
            key_display_length: 50,
            health: HealthThresholds::default(),
        }
    }
}
