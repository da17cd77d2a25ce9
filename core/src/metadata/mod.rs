//! Metadata construction and compaction
//!
//! Turns a validated upload into [`crate::models::DatasetMetadata`] and shrinks
//! it to the payload stored on the ledger.

mod builder;
mod compactor;
mod preview;
mod readiness;

pub use builder::{create_metadata, create_metadata_at};
pub use compactor::{
    compact, decode_payload, CompactPayload, CompactionLevel, OnChainMetadata,
    FULL_HASH_PREFIX_CHARS, MAX_ONCHAIN_METADATA_BYTES, MIN_HASH_PREFIX_CHARS,
};
pub use preview::{generate_preview, DatasetPreview};
pub use readiness::{assess_tokenization, TokenizationReadiness};
