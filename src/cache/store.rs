//! Cache Store Module
//!
//! Entry storage bounded by entry count and total payload size, with LRU
//! eviction and lazy TTL expiry.
//!
//! The store is not synchronized on its own; the façade keeps it behind a
//! single mutex so that every method here runs as one atomic step.

use std::collections::HashMap;
use std::time::Instant;

use bytes::Bytes;
use serde::Serialize;

use crate::cache::{expiry, CacheEntry, LruTracker};

// == Store Snapshot ==
/// Point-in-time size accounting of the live entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreSnapshot {
    pub entry_count: usize,
    pub total_size: usize,
    /// Bytes held by compressed entries
    pub compressed_bytes: usize,
    /// Bytes held by raw entries
    pub uncompressed_bytes: usize,
}

// == Lookup Result ==
/// Outcome of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Live entry; the payload handle is copied out so it can be decoded unlocked
    Hit { payload: Bytes, compressed: bool },
    /// Entry was present but expired and has been removed
    Expired,
    /// No entry under this key
    Missing,
}

// == Insert Result ==
/// What an insert did besides storing the entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Entries evicted to make room
    pub evicted: usize,
    /// False when the entry alone exceeds the store bounds and was dropped
    pub stored: bool,
}

// == Top Key ==
/// A read-count report line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopKey {
    pub key: String,
    pub access_count: u64,
    pub size_bytes: usize,
    pub compressed: bool,
}

// == Cache Store ==
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Sum of `size_bytes` over all entries
    total_size: usize,
    /// Portion of `total_size` held by compressed entries
    compressed_bytes: usize,
    max_entries: usize,
    max_total_size: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store holding at most `max_entries` entries and
    /// `max_total_size` payload bytes.
    pub fn new(max_entries: usize, max_total_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            total_size: 0,
            compressed_bytes: 0,
            max_entries,
            max_total_size,
        }
    }

    // == Insert ==
    /// Stores an entry, replacing any previous entry under the same key.
    ///
    /// Least recently used entries are evicted until the new entry fits, before
    /// it is stored. An entry that cannot fit even in an empty store is not
    /// stored, and the previous value under its key is dropped.
    pub fn insert(&mut self, key: String, entry: CacheEntry) -> InsertOutcome {
        self.remove(&key);

        let size = entry.size_bytes();
        if self.max_entries == 0 || size > self.max_total_size {
            return InsertOutcome {
                evicted: 0,
                stored: false,
            };
        }

        let mut evicted = 0;
        while self.entries.len() + 1 > self.max_entries
            || self.total_size + size > self.max_total_size
        {
            match self.lru.evict_oldest() {
                Some(oldest) => {
                    if let Some(old) = self.entries.remove(&oldest) {
                        self.release(&old);
                    }
                    evicted += 1;
                }
                None => break,
            }
        }

        self.charge(&entry);
        self.entries.insert(key.clone(), entry);
        self.lru.touch(&key);

        InsertOutcome {
            evicted,
            stored: true,
        }
    }

    // == Lookup ==
    /// Looks up a key as of `now` without touching recency.
    ///
    /// An expired entry is removed as a side effect. A hit only counts as a
    /// read once the caller confirms it with [`CacheStore::record_read`].
    pub fn lookup(&mut self, key: &str, now: Instant) -> Lookup {
        let Some(entry) = self.entries.get(key) else {
            return Lookup::Missing;
        };

        if expiry::is_expired(entry, now) {
            self.remove(key);
            return Lookup::Expired;
        }

        Lookup::Hit {
            payload: entry.payload.clone(),
            compressed: entry.compressed,
        }
    }

    // == Record Read ==
    /// Promotes `key` to most recently used and bumps its access count.
    ///
    /// Nothing happens unless the entry still holds `payload`, so a read that
    /// raced with an overwrite does not credit the new value.
    pub fn record_read(&mut self, key: &str, payload: &Bytes, now: Instant) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) if entry.payload == *payload => {
                entry.record_access(now);
                self.lru.touch(key);
                true
            }
            _ => false,
        }
    }

    // == Contains ==
    /// Returns true if a live entry exists, without touching recency.
    pub fn contains(&self, key: &str, now: Instant) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !expiry::is_expired(entry, now))
    }

    // == Remove ==
    /// Removes an entry by key. Returns true if something was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(old) => {
                self.lru.remove(key);
                self.release(&old);
                true
            }
            None => false,
        }
    }

    // == Remove If ==
    /// Removes the entry under `key` only if `condition` holds for it.
    pub fn remove_if<F>(&mut self, key: &str, condition: F) -> bool
    where
        F: FnOnce(&CacheEntry) -> bool,
    {
        let matches = self.entries.get(key).is_some_and(condition);
        matches && self.remove(key)
    }

    // == Remove Matching ==
    /// Removes every entry whose key satisfies `predicate`.
    ///
    /// This is a linear scan over all keys.
    pub fn remove_matching<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let doomed: Vec<String> = self
            .entries
            .keys()
            .filter(|key| predicate(key.as_str()))
            .cloned()
            .collect();

        for key in &doomed {
            self.remove(key);
        }
        doomed.len()
    }

    // == Purge Expired ==
    /// Removes up to `limit` expired entries. Returns the number removed.
    pub fn purge_expired(&mut self, now: Instant, limit: usize) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| expiry::is_expired(entry, now))
            .map(|(key, _)| key.clone())
            .take(limit)
            .collect();

        for key in &expired {
            self.remove(key);
        }
        expired.len()
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.total_size = 0;
        self.compressed_bytes = 0;
    }

    // == Snapshot ==
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            entry_count: self.entries.len(),
            total_size: self.total_size,
            compressed_bytes: self.compressed_bytes,
            uncompressed_bytes: self.total_size - self.compressed_bytes,
        }
    }

    // == Top Keys ==
    /// The `limit` most-read entries, most reads first, ties broken by key.
    ///
    /// Read-only: recency order is untouched.
    pub fn top_keys(&self, limit: usize) -> Vec<TopKey> {
        let mut report: Vec<TopKey> = self
            .entries
            .iter()
            .map(|(key, entry)| TopKey {
                key: key.clone(),
                access_count: entry.access_count,
                size_bytes: entry.size_bytes(),
                compressed: entry.compressed,
            })
            .collect();

        report.sort_by(|a, b| {
            b.access_count
                .cmp(&a.access_count)
                .then_with(|| a.key.cmp(&b.key))
        });
        report.truncate(limit);
        report
    }

    // == Accessors ==
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Size Accounting ==
    fn charge(&mut self, entry: &CacheEntry) {
        self.total_size += entry.size_bytes();
        if entry.compressed {
            self.compressed_bytes += entry.size_bytes();
        }
    }

    fn release(&mut self, entry: &CacheEntry) {
        self.total_size -= entry.size_bytes();
        if entry.compressed {
            self.compressed_bytes -= entry.size_bytes();
        }
    }
}
