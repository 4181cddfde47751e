//! Cache Statistics Module
//!
//! Running hit/miss/eviction counters plus a bounded log of recent operation
//! timings.
//!
//! Counters are atomics and the timing log has its own lock, so recording
//! never contends with the store's mutex.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;

use crate::cache::StoreSnapshot;

/// Default cap on the timing log before it is trimmed.
pub const DEFAULT_LOG_CAPACITY: usize = 10_000;

/// Default number of most recent operations averaged for response times.
pub const DEFAULT_RESPONSE_TIME_WINDOW: usize = 1000;

// == Operation ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Get,
    Set,
}

// == Performance Log Entry ==
/// Timing of a single `get` or `set`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceLogEntry {
    pub key: String,
    pub operation: Operation,
    pub duration_micros: u64,
    /// Always false for `set`
    pub was_hit: bool,
}

// == Response Times ==
/// Mean latencies over the most recent window of logged operations, in ms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ResponseTimes {
    /// Operations the averages were taken over
    pub samples: usize,
    /// Mean over every operation in the window
    pub average_ms: f64,
    /// Mean over `get` hits in the window
    pub hit_ms: f64,
    /// Mean over `get` misses in the window
    pub miss_ms: f64,
}

// == Cache Stats ==
/// Snapshot of cache statistics.
///
/// Holds only raw inputs; rates and ratios are computed by the methods below
/// so they always agree with the counters they derive from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Successful `get`s
    pub hits: u64,
    /// `get`s that found nothing, an expired entry, or a corrupt entry
    pub misses: u64,
    /// Completed `set`s
    pub writes: u64,
    /// Entries dropped to make room
    pub evictions: u64,
    /// Entries dropped because their TTL elapsed
    pub expirations: u64,
    /// Entries dropped because their payload failed to decode
    pub corruptions: u64,
    /// Live entry count and size accounting
    pub store: StoreSnapshot,
    pub max_entries: usize,
    pub max_total_size: usize,
    pub response_times: ResponseTimes,
}

impl CacheStats {
    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Compression Ratio ==
    /// Fraction of live stored bytes held in compressed form, 0.0 when empty.
    pub fn compression_ratio(&self) -> f64 {
        let total = self.store.compressed_bytes + self.store.uncompressed_bytes;
        if total == 0 {
            0.0
        } else {
            self.store.compressed_bytes as f64 / total as f64
        }
    }

    // == Memory Usage ==
    /// Fraction of `max_total_size` in use, 0.0 for a zero-sized store.
    pub fn memory_usage(&self) -> f64 {
        if self.max_total_size == 0 {
            0.0
        } else {
            self.store.total_size as f64 / self.max_total_size as f64
        }
    }
}

// == Stats Collector ==
#[derive(Debug)]
pub struct StatsCollector {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
    corruptions: AtomicU64,
    /// Most recent operation timings, oldest first. Lossy: trimmed to the newest
    /// half of `log_capacity` whenever it overflows, so it is diagnostic only.
    log: Mutex<VecDeque<PerformanceLogEntry>>,
    log_capacity: usize,
    window: usize,
}

impl StatsCollector {
    // == Constructor ==
    pub fn new(log_capacity: usize, window: usize) -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
            corruptions: AtomicU64::new(0),
            log: Mutex::new(VecDeque::new()),
            log_capacity: log_capacity.max(1),
            window,
        }
    }

    // == Recording ==
    pub fn record_hit(&self, key: &str, duration: Duration) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        self.log_operation(key, Operation::Get, duration, true);
    }

    pub fn record_miss(&self, key: &str, duration: Duration) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        self.log_operation(key, Operation::Get, duration, false);
    }

    pub fn record_write(&self, key: &str, duration: Duration) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.log_operation(key, Operation::Set, duration, false);
    }

    pub fn record_evictions(&self, count: usize) {
        self.evictions.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_expirations(&self, count: usize) {
        self.expirations.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_corruption(&self) {
        self.corruptions.fetch_add(1, Ordering::Relaxed);
    }

    fn log_operation(&self, key: &str, operation: Operation, duration: Duration, was_hit: bool) {
        let mut log = self.log.lock();
        log.push_back(PerformanceLogEntry {
            key: key.to_string(),
            operation,
            duration_micros: duration.as_micros().min(u64::MAX as u128) as u64,
            was_hit,
        });

        if log.len() > self.log_capacity {
            let keep = (self.log_capacity / 2).max(1);
            let excess = log.len() - keep;
            log.drain(..excess);
        }
    }

    // == Reset ==
    /// Zeroes all counters and empties the timing log.
    pub fn reset(&self) {
        for counter in [
            &self.hits,
            &self.misses,
            &self.writes,
            &self.evictions,
            &self.expirations,
            &self.corruptions,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        self.log.lock().clear();
    }

    // == Response Times ==
    /// Averages over the most recent `window` logged operations.
    pub fn response_times(&self) -> ResponseTimes {
        let log = self.log.lock();
        let skip = log.len().saturating_sub(self.window);

        let mut all = (0u64, 0usize);
        let mut hits = (0u64, 0usize);
        let mut misses = (0u64, 0usize);
        for entry in log.iter().skip(skip) {
            all.0 += entry.duration_micros;
            all.1 += 1;
            match (entry.operation, entry.was_hit) {
                (Operation::Get, true) => {
                    hits.0 += entry.duration_micros;
                    hits.1 += 1;
                }
                (Operation::Get, false) => {
                    misses.0 += entry.duration_micros;
                    misses.1 += 1;
                }
                (Operation::Set, _) => {}
            }
        }

        ResponseTimes {
            samples: all.1,
            average_ms: mean_ms(all),
            hit_ms: mean_ms(hits),
            miss_ms: mean_ms(misses),
        }
    }

    // == Recent Operations ==
    /// The newest `limit` log entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<PerformanceLogEntry> {
        self.log.lock().iter().rev().take(limit).cloned().collect()
    }

    /// The slowest operation still in the log.
    pub fn slowest(&self) -> Option<PerformanceLogEntry> {
        self.log
            .lock()
            .iter()
            .max_by_key(|entry| entry.duration_micros)
            .cloned()
    }

    pub fn logged_operations(&self) -> usize {
        self.log.lock().len()
    }

    // == Snapshot ==
    /// Combines the counters with a store snapshot.
    pub fn snapshot(
        &self,
        store: StoreSnapshot,
        max_entries: usize,
        max_total_size: usize,
    ) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            corruptions: self.corruptions.load(Ordering::Relaxed),
            store,
            max_entries,
            max_total_size,
            response_times: self.response_times(),
        }
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY, DEFAULT_RESPONSE_TIME_WINDOW)
    }
}

fn mean_ms((total_micros, count): (u64, usize)) -> f64 {
    if count == 0 {
        0.0
    } else {
        total_micros as f64 / count as f64 / 1000.0
    }
}
