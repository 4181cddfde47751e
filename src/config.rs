//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{CacheConfig, HealthThresholds};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Maximum total stored payload size in bytes
    pub max_total_size: usize,
    /// Default TTL in seconds for entries without explicit TTL
    pub default_ttl: u64,
    /// Payloads above this many bytes are compressed
    pub compression_threshold: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Expiry sweep interval in seconds, 0 disables the sweep
    pub cleanup_interval: u64,
    /// Health warning below this hit rate (fraction)
    pub health_min_hit_rate: f64,
    /// Health warning above this memory usage (fraction)
    pub health_max_memory_usage: f64,
    /// Health warning above this mean response time in milliseconds
    pub health_max_response_time_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `MAX_TOTAL_SIZE` - Maximum stored bytes (default: 104857600)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `COMPRESSION_THRESHOLD` - Compression threshold in bytes (default: 1024)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `HEALTH_MIN_HIT_RATE` - (default: 0.7)
    /// - `HEALTH_MAX_MEMORY_USAGE` - (default: 0.9)
    /// - `HEALTH_MAX_RESPONSE_TIME_MS` - (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            max_total_size: env_or("MAX_TOTAL_SIZE", defaults.max_total_size),
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            compression_threshold: env_or("COMPRESSION_THRESHOLD", defaults.compression_threshold),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            health_min_hit_rate: env_or("HEALTH_MIN_HIT_RATE", defaults.health_min_hit_rate),
            health_max_memory_usage: env_or(
                "HEALTH_MAX_MEMORY_USAGE",
                defaults.health_max_memory_usage,
            ),
            health_max_response_time_ms: env_or(
                "HEALTH_MAX_RESPONSE_TIME_MS",
                defaults.health_max_response_time_ms,
            ),
        }
    }

    /// Builds the cache construction parameters.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_entries: self.max_entries,
            max_total_size: self.max_total_size,
            default_ttl: Duration::from_secs(self.default_ttl),
            compression_threshold: self.compression_threshold,
            health: HealthThresholds {
                min_hit_rate: self.health_min_hit_rate,
                max_memory_usage: self.health_max_memory_usage,
                max_average_response_time: Duration::from_millis(
                    self.health_max_response_time_ms,
                ),
            },
            ..CacheConfig::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            max_total_size: 100 * 1024 * 1024,
            default_ttl: 300,
            compression_threshold: 1024,
            server_port: 3000,
            cleanup_interval: 60,
            health_min_hit_rate: 0.7,
            health_max_memory_usage: 0.9,
            health_max_response_time_ms: 10,
        }
    }
}

/// Parses an environment variable, falling back to `default` when unset or invalid.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
