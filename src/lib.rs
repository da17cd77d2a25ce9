/// Dataset Anchor - CSV fingerprinting and on-ledger dataset tokens
///
/// This is the root crate that provides workspace-level documentation.
/// Actual implementation is in the subcrates:
/// - `dataset-anchor-core`: CSV parsing, validation, fingerprinting, schema inference and metadata compaction
/// - `dataset-anchor-minter`: Mint orchestration against the token service and audit log
/// - `dataset-anchor-service`: HTTP surface for validation and minting
/// - `dataset-anchor-client`: Client library for interacting with the service

/// This module is intentionally empty as the actual implementation
/// is in the subcrates.
/// Returns the version of the package.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
