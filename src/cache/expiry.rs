//! Expiry Policy
//!
//! TTL is judged lazily: whoever reads an entry decides whether it is still live.

use std::time::Instant;

use crate::cache::CacheEntry;

/// Returns true once more than `entry.ttl` has elapsed since creation.
///
/// An entry read exactly at `created_at + ttl` is still live.
pub fn is_expired(entry: &CacheEntry, now: Instant) -> bool {
    now.saturating_duration_since(entry.created_at) > entry.ttl
}
