//! # Dataset Anchor Core
//!
//! CSV ingestion, validation, fingerprinting and metadata compaction for
//! Dataset Anchor. Nothing in this crate performs I/O against the ledger; it
//! produces the size-bounded payload the minter anchors.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod crypto;
pub mod error;
pub mod metadata;
pub mod models;
pub mod pipeline;
pub mod schema;
pub mod tabular;
pub mod utils;

/// Re-export common types for ease of use
pub use config::{CoreConfig, IngestLimits};
pub use crypto::{fingerprint, ContentHash};
pub use error::{CoreError, Result};
pub use metadata::{compact, CompactPayload, MAX_ONCHAIN_METADATA_BYTES};
pub use models::{DatasetMetadata, MintResult, ParsedTable, RawDocument, ValidationResult};
pub use pipeline::{IngestPipeline, Ingestion, PreparedDataset};

/// Version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
