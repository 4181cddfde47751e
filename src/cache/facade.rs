//! Cache Façade
//!
//! The public operation set, composing codec, store, statistics and
//! diagnostics.
//!
//! Locking: the store sits behind one mutex, taken for every store call
//! including lookups (which may remove expired entries). Serialization and
//! compression run before the lock is taken, decompression after it is
//! released. Statistics have their own synchronization.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::cache::{
    diagnostics, CacheConfig, CacheEntry, CacheStats, CacheStore, Codec, HealthReport, Lookup,
    PerformanceLogEntry, StatsCollector, TopKey,
};
use crate::error::Result;

/// Keys removed per store lock acquisition by [`Cache::purge_expired`].
const PURGE_BATCH_SIZE: usize = 256;

/// Number of log entries included in [`PerformanceMetrics::recent`].
const RECENT_OPERATIONS: usize = 10;

// == Report Types ==
/// One result of [`Cache::mget`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MgetItem<T> {
    pub key: String,
    pub value: Option<T>,
}

/// Timing log summary for dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceMetrics {
    pub logged_operations: usize,
    pub log_capacity: usize,
    pub response_time_window: usize,
    pub slowest: Option<PerformanceLogEntry>,
    /// Newest first
    pub recent: Vec<PerformanceLogEntry>,
}

/// Full statistics report: the raw snapshot, its derived rates, and the
/// top-keys and timing summaries.
#[derive(Debug, Clone, Serialize)]
pub struct CacheReport {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub hit_rate: f64,
    pub memory_usage: f64,
    pub compression_ratio: f64,
    pub top_keys: Vec<TopKey>,
    pub performance: PerformanceMetrics,
}

// == Cache ==
/// Thread-safe cache handle. Share it as `Arc<Cache>`.
#[derive(Debug)]
pub struct Cache {
    store: Mutex<CacheStore>,
    stats: StatsCollector,
    codec: Codec,
    config: CacheConfig,
}

impl Cache {
    // == Constructor ==
    pub fn new(config: CacheConfig) -> Self {
        Self {
            store: Mutex::new(CacheStore::new(config.max_entries, config.max_total_size)),
            stats: StatsCollector::new(
                config.performance_log_capacity,
                config.response_time_window,
            ),
            codec: Codec::new(config.compression_threshold),
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Set ==
    /// Stores a value under `key`, with `ttl` or the configured default.
    ///
    /// Fails only if the value cannot be serialized, in which case the store is
    /// untouched. A full cache evicts rather than rejects.
    pub fn set<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let started = Instant::now();

        let raw = serde_json::to_vec(value)?;
        let raw_len = raw.len();
        let (payload, compressed) = self.codec.encode(raw);
        let entry = CacheEntry::new(payload, compressed, ttl.unwrap_or(self.config.default_ttl));
        let size = entry.size_bytes();

        let outcome = self.store.lock().insert(key.to_string(), entry);

        if outcome.evicted > 0 {
            self.stats.record_evictions(outcome.evicted);
            debug!(key, evicted = outcome.evicted, "evicted entries to make room");
        }
        if !outcome.stored {
            warn!(
                key,
                size,
                max_total_size = self.config.max_total_size,
                "entry exceeds cache bounds, not stored"
            );
        }

        self.stats.record_write(key, started.elapsed());
        debug!(key, raw_len, size, compressed, "cache set");
        Ok(())
    }

    // == Get ==
    /// Returns the live value under `key`, if any.
    ///
    /// Expired and corrupt entries are removed and reported as misses. A stored
    /// value that does not deserialize as `T` is also a miss but stays stored,
    /// with its recency and access count untouched.
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let started = Instant::now();

        let lookup = self.store.lock().lookup(key, Instant::now());

        let value = match lookup {
            Lookup::Missing => None,
            Lookup::Expired => {
                self.stats.record_expirations(1);
                debug!(key, "entry expired");
                None
            }
            Lookup::Hit {
                payload,
                compressed,
            } => match self.codec.decode(&payload, compressed) {
                Ok(raw) => match serde_json::from_slice::<T>(&raw) {
                    Ok(value) => {
                        self.store.lock().record_read(key, &payload, Instant::now());
                        Some(value)
                    }
                    Err(e) => {
                        warn!(key, "cached value has unexpected shape: {}", e);
                        None
                    }
                },
                Err(e) => {
                    error!(key, "dropping corrupt cache entry: {}", e);
                    // Only drop it if nobody replaced it since the lookup
                    self.store
                        .lock()
                        .remove_if(key, |entry| entry.payload == payload);
                    self.stats.record_corruption();
                    None
                }
            },
        };

        match value {
            Some(_) => self.stats.record_hit(key, started.elapsed()),
            None => self.stats.record_miss(key, started.elapsed()),
        }
        value
    }

    // == Multi Get ==
    /// Independent lookups for each key, in order. Not atomic across the batch.
    pub fn mget<T, S>(&self, keys: &[S]) -> Vec<MgetItem<T>>
    where
        T: DeserializeOwned,
        S: AsRef<str>,
    {
        keys.iter()
            .map(|key| MgetItem {
                key: key.as_ref().to_string(),
                value: self.get(key.as_ref()),
            })
            .collect()
    }

    // == Contains ==
    /// True if a live entry exists. Does not count as a hit or miss and does
    /// not affect recency.
    pub fn contains(&self, key: &str) -> bool {
        self.store.lock().contains(key, Instant::now())
    }

    // == Delete Pattern ==
    /// Removes every entry whose key matches `pattern`. Returns the count.
    ///
    /// Scans all keys. A malformed pattern fails before anything is removed.
    pub fn delete_pattern(&self, pattern: &str) -> Result<usize> {
        let regex = Regex::new(pattern)?;
        let removed = self
            .store
            .lock()
            .remove_matching(|key| regex.is_match(key));

        info!(pattern, removed, "deleted entries by pattern");
        Ok(removed)
    }

    // == Delete ==
    /// Removes the entry under exactly `key`. Returns true if one existed.
    pub fn delete(&self, key: &str) -> bool {
        let removed = self.store.lock().remove_matching(|candidate| candidate == key) > 0;
        debug!(key, removed, "cache delete");
        removed
    }

    // == Clear ==
    /// Drops every entry and zeroes all statistics.
    pub fn clear(&self) {
        let dropped = {
            let mut store = self.store.lock();
            let dropped = store.len();
            store.clear();
            dropped
        };
        self.stats.reset();
        info!(dropped, "cache cleared");
    }

    // == Purge Expired ==
    /// Removes all currently expired entries, one bounded batch per lock.
    pub fn purge_expired(&self) -> usize {
        let mut total = 0;
        loop {
            let removed = self
                .store
                .lock()
                .purge_expired(Instant::now(), PURGE_BATCH_SIZE);
            total += removed;
            if removed < PURGE_BATCH_SIZE {
                break;
            }
        }

        if total > 0 {
            self.stats.record_expirations(total);
        }
        total
    }

    // == Stats ==
    /// Current counters and store accounting.
    pub fn stats(&self) -> CacheStats {
        let snapshot = self.store.lock().snapshot();
        self.stats.snapshot(
            snapshot,
            self.config.max_entries,
            self.config.max_total_size,
        )
    }

    /// Stats plus derived rates, most-read keys and timing summary.
    pub fn report(&self) -> CacheReport {
        let stats = self.stats();
        let top_keys = self
            .store
            .lock()
            .top_keys(self.config.top_keys)
            .into_iter()
            .map(|mut top| {
                top.key = elide(&top.key, self.config.key_display_length);
                top
            })
            .collect();

        CacheReport {
            hit_rate: stats.hit_rate(),
            memory_usage: stats.memory_usage(),
            compression_ratio: stats.compression_ratio(),
            stats,
            top_keys,
            performance: PerformanceMetrics {
                logged_operations: self.stats.logged_operations(),
                log_capacity: self.config.performance_log_capacity,
                response_time_window: self.config.response_time_window,
                slowest: self.stats.slowest(),
                recent: self.stats.recent(RECENT_OPERATIONS),
            },
        }
    }

    // == Health Check ==
    pub fn health_check(&self) -> HealthReport {
        diagnostics::evaluate(&self.stats(), &self.config.health)
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

/// Shortens keys longer than `max_chars` for display.
fn elide(key: &str, max_chars: usize) -> String {
    if key.chars().count() <= max_chars {
        key.to_string()
    } else {
        let mut short: String = key.chars().take(max_chars).collect();
        short.push_str("...");
        short
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::HealthStatus;
    use serde::Deserialize;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::thread::{self, sleep};

    fn cache_with(max_entries: usize, max_total_size: usize) -> Cache {
        Cache::new(CacheConfig {
            max_entries,
            max_total_size,
            ..Default::default()
        })
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Profile {
        id: u32,
        name: String,
        tags: Vec<String>,
    }

    #[test]
    fn test_set_and_get_typed_value() {
        let cache = Cache::default();
        let profile = Profile {
            id: 7,
            name: "ada".to_string(),
            tags: vec!["admin".to_string()],
        };

        cache.set("user:7", &profile, None).unwrap();
        assert_eq!(cache.get::<Profile>("user:7"), Some(profile));
        assert_eq!(cache.get::<Profile>("user:8"), None);
    }

    #[test]
    fn test_large_value_is_compressed() {
        let cache = Cache::default();
        let text = "lorem ipsum dolor sit amet ".repeat(200);

        cache.set("doc", &text, None).unwrap();

        let stats = cache.stats();
        assert!(stats.store.compressed_bytes > 0);
        assert!(stats.store.total_size < text.len());
        assert_eq!(cache.get::<String>("doc"), Some(text));
    }

    #[test]
    fn test_small_value_is_not_compressed() {
        let cache = Cache::default();
        cache.set("small", "tiny", None).unwrap();

        let report = cache.report();
        assert_eq!(report.compression_ratio, 0.0);
        assert_eq!(report.stats.store.uncompressed_bytes, 6);
    }

    #[test]
    fn test_serialization_failure_leaves_store_untouched() {
        let cache = Cache::default();
        // Non-string map keys cannot be encoded as JSON objects
        let mut bad: HashMap<(u8, u8), u8> = HashMap::new();
        bad.insert((1, 2), 3);

        let result = cache.set("bad", &bad, None);
        assert!(matches!(result, Err(crate::error::CacheError::Serialization(_))));
        assert!(cache.is_empty());
        assert_eq!(cache.stats().writes, 0);
    }

    #[test]
    fn test_lru_order() {
        let cache = cache_with(3, 1024);

        cache.set("A", "a", None).unwrap();
        cache.set("B", "b", None).unwrap();
        cache.set("C", "c", None).unwrap();
        assert_eq!(cache.get::<String>("A"), Some("a".to_string()));
        cache.set("D", "d", None).unwrap();

        assert!(cache.contains("A"));
        assert!(!cache.contains("B"));
        assert!(cache.contains("C"));
        assert!(cache.contains("D"));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_lru_get_promotes_before_insert() {
        let cache = cache_with(2, 1024);

        cache.set("A", "a", None).unwrap();
        cache.set("B", "b", None).unwrap();
        assert!(cache.get::<String>("A").is_some());
        cache.set("D", "d", None).unwrap();

        assert!(cache.contains("A"));
        assert!(!cache.contains("B"));
        assert!(cache.contains("D"));
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = Cache::default();

        cache.set("k", "v", Some(Duration::from_millis(100))).unwrap();
        assert_eq!(cache.get::<String>("k"), Some("v".to_string()));

        sleep(Duration::from_millis(150));

        assert_eq!(cache.get::<String>("k"), None);
        let stats = cache.stats();
        assert_eq!(stats.store.entry_count, 0);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.evictions, 0);
    }

    #[test]
    fn test_hit_rate() {
        let cache = Cache::default();
        cache.set("k", &1, None).unwrap();

        for _ in 0..3 {
            assert_eq!(cache.get::<i32>("k"), Some(1));
        }
        assert_eq!(cache.get::<i32>("missing"), None);

        assert_eq!(cache.stats().hit_rate(), 0.75);
    }

    #[test]
    fn test_type_mismatch_is_miss_but_kept() {
        let cache = Cache::default();
        cache.set("k", "not a number", None).unwrap();

        assert_eq!(cache.get::<u64>("k"), None);
        assert!(cache.contains("k"));
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().hits, 0);
        assert_eq!(cache.report().top_keys[0].access_count, 0);
    }

    #[test]
    fn test_type_mismatch_does_not_promote() {
        let cache = Cache::new(CacheConfig {
            max_entries: 2,
            ..Default::default()
        });
        cache.set("A", "a", None).unwrap();
        cache.set("B", "b", None).unwrap();

        assert_eq!(cache.get::<u64>("A"), None);
        cache.set("C", "c", None).unwrap();

        // A is still the least recently used entry
        assert!(!cache.contains("A"));
        assert!(cache.contains("B"));
        assert!(cache.contains("C"));
    }

    #[test]
    fn test_corrupt_entry_is_removed() {
        let cache = Cache::default();
        let truncated = {
            let packed = crate::cache::codec::compress(&[b'x'; 4096]).unwrap();
            bytes::Bytes::copy_from_slice(&packed[..packed.len() / 2])
        };
        cache.store.lock().insert(
            "bad".to_string(),
            CacheEntry::new(truncated, true, Duration::from_secs(60)),
        );

        assert_eq!(cache.get::<String>("bad"), None);
        assert!(!cache.contains("bad"));
        let stats = cache.stats();
        assert_eq!(stats.corruptions, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_clear_zeroes_everything() {
        let cache = Cache::default();
        cache.set("a", "1", None).unwrap();
        cache.get::<String>("a");
        cache.get::<String>("b");

        cache.clear();

        let stats = cache.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.store.entry_count, 0);
        assert_eq!(stats.store.total_size, 0);
    }

    #[test]
    fn test_delete_pattern() {
        let cache = Cache::default();
        cache.set("a:1", "x", None).unwrap();
        cache.set("a:2", "y", None).unwrap();
        cache.set("b:1", "z", None).unwrap();

        assert_eq!(cache.delete_pattern("^a:").unwrap(), 2);
        assert_eq!(cache.get::<String>("b:1"), Some("z".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_delete_pattern_invalid_regex() {
        let cache = Cache::default();
        cache.set("a:1", "x", None).unwrap();

        let result = cache.delete_pattern("a:(");
        assert!(matches!(result, Err(crate::error::CacheError::InvalidPattern(_))));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_delete_is_exact() {
        let cache = Cache::default();
        cache.set("user.1", "x", None).unwrap();
        cache.set("userX1", "y", None).unwrap();

        assert!(cache.delete("user.1"));
        assert!(!cache.delete("user.1"));
        assert!(cache.contains("userX1"));
    }

    #[test]
    fn test_mget() {
        let cache = Cache::default();
        cache.set("a", &1, None).unwrap();
        cache.set("c", &3, None).unwrap();

        let items: Vec<MgetItem<i32>> = cache.mget(&["a", "b", "c"]);
        let values: Vec<Option<i32>> = items.iter().map(|item| item.value).collect();
        assert_eq!(values, vec![Some(1), None, Some(3)]);
        assert_eq!(items[1].key, "b");
    }

    #[test]
    fn test_oversized_value_is_dropped_not_rejected() {
        let cache = Cache::new(CacheConfig {
            max_total_size: 16,
            compression_threshold: usize::MAX,
            ..Default::default()
        });

        cache.set("big", &"x".repeat(64), None).unwrap();
        assert!(!cache.contains("big"));
        assert_eq!(cache.stats().store.total_size, 0);
    }

    #[test]
    fn test_bounds_hold_under_size_pressure() {
        let cache = Cache::new(CacheConfig {
            max_entries: 50,
            max_total_size: 500,
            compression_threshold: usize::MAX,
            ..Default::default()
        });

        for i in 0..200 {
            cache.set(&format!("k{}", i), &"v".repeat(i % 40), None).unwrap();
            let stats = cache.stats();
            assert!(stats.store.entry_count <= 50);
            assert!(stats.store.total_size <= 500);
        }
    }

    #[test]
    fn test_purge_expired() {
        let cache = Cache::default();
        for i in 0..300 {
            cache.set(&format!("short{}", i), &i, Some(Duration::ZERO)).unwrap();
        }
        cache.set("long", &1, None).unwrap();

        sleep(Duration::from_millis(5));

        assert_eq!(cache.purge_expired(), 300);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().expirations, 300);
    }

    #[test]
    fn test_report_top_keys_elided() {
        let cache = Cache::new(CacheConfig {
            key_display_length: 8,
            ..Default::default()
        });
        let long_key = "session:abcdefghijklmnop";
        cache.set(long_key, "x", None).unwrap();
        cache.set("short", "y", None).unwrap();
        cache.get::<String>(long_key);
        cache.get::<String>(long_key);

        let report = cache.report();
        assert_eq!(report.top_keys[0].key, "session:...");
        assert_eq!(report.top_keys[0].access_count, 2);
        assert_eq!(report.top_keys[1].key, "short");
        assert_eq!(report.performance.logged_operations, 4);
        assert_eq!(report.performance.recent.len(), 4);
    }

    #[test]
    fn test_health_check_fresh_cache() {
        let cache = Cache::default();
        cache.set("k", "v", None).unwrap();
        for _ in 0..10 {
            cache.get::<String>("k");
        }

        let report = cache.health_check();
        assert_eq!(report.status, HealthStatus::Healthy);
    }

    #[test]
    fn test_concurrent_access_keeps_bounds() {
        let cache = Arc::new(cache_with(64, 4096));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..500 {
                        let key = format!("t{}:{}", t, i % 100);
                        cache.set(&key, &i, None).unwrap();
                        cache.get::<i32>(&key);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let stats = cache.stats();
        assert!(stats.store.entry_count <= 64);
        assert!(stats.store.total_size <= 4096);
        assert_eq!(stats.writes, 4000);
        assert_eq!(stats.hits + stats.misses, 4000);
    }

    #[test]
    fn test_elide() {
        assert_eq!(elide("abc", 5), "abc");
        assert_eq!(elide("abcdef", 5), "abcde...");
    }
}
