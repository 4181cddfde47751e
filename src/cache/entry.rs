//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

use bytes::Bytes;

// == Cache Entry ==
/// A single stored payload plus its bookkeeping.
///
/// Owned exclusively by the store; the payload buffer is released when the
/// entry is dropped on eviction, expiry or removal.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Serialized value, possibly compressed
    pub payload: Bytes,
    /// Whether `payload` is compressed
    pub compressed: bool,
    /// Creation instant
    pub created_at: Instant,
    /// Time to live measured from `created_at`
    pub ttl: Duration,
    /// Number of successful reads
    pub access_count: u64,
    /// Instant of the last successful read (or creation)
    pub last_accessed_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current instant.
    pub fn new(payload: Bytes, compressed: bool, ttl: Duration) -> Self {
        Self::created_at(payload, compressed, ttl, Instant::now())
    }

    /// Creates a new entry stamped with `now`.
    pub fn created_at(payload: Bytes, compressed: bool, ttl: Duration, now: Instant) -> Self {
        Self {
            payload,
            compressed,
            created_at: now,
            ttl,
            access_count: 0,
            last_accessed_at: now,
        }
    }

    // == Size ==
    /// Size charged against the store's total-size budget.
    ///
    /// This is the stored size, so compressed entries are charged post-compression.
    pub fn size_bytes(&self) -> usize {
        self.payload.len()
    }

    // == Record Access ==
    /// Updates access bookkeeping after a successful read.
    pub fn record_access(&mut self, now: Instant) {
        self.access_count += 1;
        self.last_accessed_at = now;
    }
}
