//! On-chain metadata compaction
//!
//! The ledger stores at most [`MAX_ONCHAIN_METADATA_BYTES`] of metadata per
//! token. Compaction tries progressively smaller payloads and fails rather
//! than shorten the hash prefix below [`MIN_HASH_PREFIX_CHARS`].
//!
//! The result is lossy. Schema, summary and the full fingerprint cannot be
//! recovered from the payload and must be kept by the caller.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{to_serialization_error, CoreError, Result};
use crate::models::DatasetMetadata;

/// Ledger-imposed ceiling on per-token metadata
pub const MAX_ONCHAIN_METADATA_BYTES: usize = 100;

/// Hash prefix length at level 1
pub const FULL_HASH_PREFIX_CHARS: usize = 12;

/// Hash prefix length at level 2, the shortest ever produced
pub const MIN_HASH_PREFIX_CHARS: usize = 8;

/// How far a payload had to be reduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CompactionLevel {
    /// 12-character hash prefix plus row and column counts
    Full,

    /// 8-character hash prefix only
    HashOnly,
}

/// Payload shape stored on the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnChainMetadata {
    /// Hash prefix
    #[serde(rename = "h")]
    pub hash_prefix: String,

    /// Row count
    #[serde(rename = "r", default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,

    /// Column count
    #[serde(rename = "c", default, skip_serializing_if = "Option::is_none")]
    pub column_count: Option<usize>,
}

impl OnChainMetadata {
    fn at_level(metadata: &DatasetMetadata, level: CompactionLevel) -> Self {
        match level {
            CompactionLevel::Full => OnChainMetadata {
                hash_prefix: metadata.hash.hex_prefix(FULL_HASH_PREFIX_CHARS),
                row_count: Some(metadata.row_count),
                column_count: Some(metadata.column_count()),
            },
            CompactionLevel::HashOnly => OnChainMetadata {
                hash_prefix: metadata.hash.hex_prefix(MIN_HASH_PREFIX_CHARS),
                row_count: None,
                column_count: None,
            },
        }
    }
}

/// Serialized payload ready for the ledger, never longer than the ceiling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactPayload {
    level: CompactionLevel,
    bytes: Vec<u8>,
}

impl CompactPayload {
    /// Reduction level that produced this payload
    pub fn level(&self) -> CompactionLevel {
        self.level
    }

    /// Payload bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consume into raw bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Compact metadata under the ledger ceiling
pub fn compact(metadata: &DatasetMetadata) -> Result<CompactPayload> {
    compact_within(metadata, MAX_ONCHAIN_METADATA_BYTES)
}

/// Compact metadata under an arbitrary ceiling
pub(crate) fn compact_within(metadata: &DatasetMetadata, limit: usize) -> Result<CompactPayload> {
    let mut smallest = 0;

    for level in [CompactionLevel::Full, CompactionLevel::HashOnly] {
        let bytes = serde_json::to_vec(&OnChainMetadata::at_level(metadata, level))
            .map_err(to_serialization_error)?;
        if bytes.len() <= limit {
            debug!(
                "Compacted metadata for {} to {} bytes at {:?}",
                metadata.file_name,
                bytes.len(),
                level
            );
            return Ok(CompactPayload { level, bytes });
        }
        smallest = bytes.len();
    }

    warn!(
        "Metadata for {} does not fit in {} bytes (smallest {})",
        metadata.file_name, limit, smallest
    );
    Err(CoreError::PayloadTooLarge { size: smallest, limit })
}

/// Parse a payload read back from the ledger
pub fn decode_payload(bytes: &[u8]) -> Result<OnChainMetadata> {
    if bytes.len() > MAX_ONCHAIN_METADATA_BYTES {
        return Err(CoreError::PayloadTooLarge {
            size: bytes.len(),
            limit: MAX_ONCHAIN_METADATA_BYTES,
        });
    }
    let decoded: OnChainMetadata = serde_json::from_slice(bytes)
        .map_err(|e| CoreError::InvalidPayload(e.to_string()))?;
    if decoded.hash_prefix.len() < MIN_HASH_PREFIX_CHARS
        || !decoded.hash_prefix.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return Err(CoreError::InvalidPayload(format!(
            "hash prefix {:?} is not at least {} hex characters",
            decoded.hash_prefix, MIN_HASH_PREFIX_CHARS
        )));
    }
    Ok(decoded)
}
