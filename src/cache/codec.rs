//! Codec Module
//!
//! LZ4 block compression for serialized payloads above a size threshold.
//!
//! The compressed layout (LZ4 block with a prepended length) is internal to
//! this crate and may change between versions.

use bytes::Bytes;
use tracing::debug;

use crate::error::{CacheError, Result};

/// Default payload size (bytes) above which compression is attempted.
pub const DEFAULT_COMPRESSION_THRESHOLD: usize = 1024;

// == Raw Codec Functions ==
/// Compresses a byte slice.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    lz4::block::compress(data, None, true).map_err(|e| CacheError::Codec(e.to_string()))
}

/// Decompresses bytes previously produced by [`compress`].
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    lz4::block::decompress(data, None).map_err(|e| CacheError::Codec(e.to_string()))
}

// == Codec ==
/// Applies the compression policy to serialized payloads.
///
/// Payloads at or below the threshold are stored raw. Larger payloads are
/// compressed, but the raw form is kept when compression fails or does not
/// shrink the payload. Callers must read the returned flag, never assume.
#[derive(Debug, Clone, Copy)]
pub struct Codec {
    threshold: usize,
}

impl Codec {
    /// Creates a codec compressing payloads larger than `threshold` bytes.
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    // == Encode ==
    /// Turns a serialized payload into its stored form.
    ///
    /// Returns the stored bytes and whether they are compressed.
    pub fn encode(&self, raw: Vec<u8>) -> (Bytes, bool) {
        if raw.len() <= self.threshold {
            return (Bytes::from(raw), false);
        }

        match compress(&raw) {
            Ok(packed) if packed.len() < raw.len() => {
                debug!(raw = raw.len(), packed = packed.len(), "payload compressed");
                (Bytes::from(packed), true)
            }
            Ok(_) => (Bytes::from(raw), false),
            Err(e) => {
                debug!("compression failed, storing raw: {}", e);
                (Bytes::from(raw), false)
            }
        }
    }

    // == Decode ==
    /// Recovers the serialized payload from its stored form.
    pub fn decode(&self, stored: &[u8], compressed: bool) -> Result<Vec<u8>> {
        if compressed {
            decompress(stored)
        } else {
            Ok(stored.to_vec())
        }
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(DEFAULT_COMPRESSION_THRESHOLD)
    }
}
