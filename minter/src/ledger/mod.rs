//! Ledger collaborators
//!
//! The orchestrator talks to the ledger only through [`TokenService`] and
//! [`AuditLog`]. [`GatewayLedger`] implements both over HTTP;
//! [`InMemoryLedger`] implements both in process for dry runs.

mod gateway;
mod memory;

pub use gateway::GatewayLedger;
pub use memory::InMemoryLedger;

use std::fmt;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Ledger id of a token collection, e.g. `0.0.4242`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(pub String);

impl CollectionId {
    /// Id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parameters for the one-time collection setup
///
/// The collection is non-fungible with infinite supply; the operator key is
/// both treasury and supply key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSpec {
    /// Collection name
    pub name: String,

    /// Collection symbol
    pub symbol: String,
}

/// Receipt of a successful mint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintReceipt {
    /// Serial number of the new token
    pub serial_number: u64,

    /// Ledger transaction id
    pub transaction_id: String,
}

/// Receipt of a successful audit-log submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReceipt {
    /// Topic the message was appended to
    pub topic_id: String,

    /// Ledger transaction id
    pub transaction_id: String,

    /// Consensus timestamp, `seconds.nanos`
    pub consensus_timestamp: String,

    /// Position of the message in the topic
    pub sequence_number: u64,
}

/// Token-service collaborator
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TokenService: Send + Sync {
    /// Create a collection and return its id
    async fn create_collection(&self, spec: &CollectionSpec) -> Result<CollectionId>;

    /// Mint one token carrying `payload` as its metadata
    async fn mint(&self, collection: &CollectionId, payload: Vec<u8>) -> Result<MintReceipt>;
}

/// Audit-log collaborator
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append a message to a topic
    async fn submit(&self, topic_id: &str, message: String) -> Result<AuditReceipt>;
}
