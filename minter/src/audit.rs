//! Audit-log message
//!
//! A provenance record appended to the audit topic before minting. It carries
//! the full fingerprint, unlike the compacted token payload.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use dataset_anchor_core::DatasetMetadata;

use crate::error::Result;

/// Message type tag
pub const AUDIT_MESSAGE_TYPE: &str = "dataset-verification";

/// Audit-log message body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditMessage {
    /// Always [`AUDIT_MESSAGE_TYPE`]
    #[serde(rename = "type")]
    pub kind: String,

    /// Full content fingerprint
    pub hash: String,

    /// Declared file name
    pub file_name: String,

    /// Row count
    pub row_count: usize,

    /// Column count
    pub column_count: usize,

    /// Upload time from the metadata
    pub upload_date: String,

    /// Submission time
    pub timestamp: String,
}

impl AuditMessage {
    /// Build the message for `metadata`, submitted at `now`
    pub fn new(metadata: &DatasetMetadata, now: DateTime<Utc>) -> Self {
        AuditMessage {
            kind: AUDIT_MESSAGE_TYPE.to_string(),
            hash: metadata.hash.to_hex(),
            file_name: metadata.file_name.clone(),
            row_count: metadata.row_count,
            column_count: metadata.column_count(),
            upload_date: metadata.upload_date.to_rfc3339_opts(SecondsFormat::Millis, true),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// JSON body sent to the topic
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
