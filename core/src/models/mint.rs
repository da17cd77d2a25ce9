//! Mint outcome records

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

use super::metadata::DatasetMetadata;

/// Durable outcome of a successful mint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintResult {
    /// Collection the token was minted under
    pub token_id: String,

    /// Serial number of the minted token
    pub serial_number: u64,

    /// Ledger transaction id of the mint
    pub transaction_id: String,

    /// Time the mint receipt was observed
    pub timestamp: DateTime<Utc>,

    /// Explorer link for the collection
    pub explorer_url: String,

    /// Consensus timestamp of the audit-log entry, when one was recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_timestamp: Option<String>,

    /// Sequence number of the audit-log entry, when one was recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_sequence_number: Option<u64>,
}

impl MintResult {
    /// Whether an audit-log entry backs this mint
    pub fn has_audit_record(&self) -> bool {
        self.audit_timestamp.is_some()
    }
}

/// Record shape kept by the browser gallery for each minted dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryRecord {
    /// Collection id
    pub token_id: String,

    /// Serial number
    pub serial_number: u64,

    /// Full dataset metadata
    pub metadata: DatasetMetadata,

    /// Mint time
    pub timestamp: DateTime<Utc>,

    /// Explorer link
    pub explorer_url: String,
}

impl GalleryRecord {
    /// Build the gallery entry for a mint
    pub fn from_mint(result: &MintResult, metadata: &DatasetMetadata) -> Self {
        GalleryRecord {
            token_id: result.token_id.clone(),
            serial_number: result.serial_number,
            metadata: metadata.clone(),
            timestamp: result.timestamp,
            explorer_url: result.explorer_url.clone(),
        }
    }
}
