//! In-process ledger for dry runs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use log::info;
use tokio::sync::Mutex;

use super::{AuditLog, AuditReceipt, CollectionId, CollectionSpec, MintReceipt, TokenService};
use crate::error::{MintError, Result};

/// Shard and realm used for generated entity ids
const ENTITY_PREFIX: &str = "0.0.";

/// First entity number handed out
const FIRST_ENTITY: u64 = 1000;

#[derive(Debug, Default)]
struct LedgerState {
    next_entity: u64,
    collections: HashMap<CollectionId, CollectionSpec>,
    tokens: HashMap<CollectionId, Vec<Vec<u8>>>,
    topics: HashMap<String, Vec<String>>,
}

impl LedgerState {
    fn allocate(&mut self) -> u64 {
        if self.next_entity == 0 {
            self.next_entity = FIRST_ENTITY;
        }
        self.next_entity += 1;
        self.next_entity
    }
}

/// Ledger that keeps collections, tokens and topic messages in memory
///
/// Ids and timestamps follow the ledger's formats so that results are
/// indistinguishable in shape from real ones.
#[derive(Debug)]
pub struct InMemoryLedger {
    operator: String,
    state: Mutex<LedgerState>,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new("0.0.2")
    }
}

impl InMemoryLedger {
    /// Create a ledger operated by `operator`
    pub fn new(operator: impl Into<String>) -> Self {
        InMemoryLedger {
            operator: operator.into(),
            state: Mutex::new(LedgerState::default()),
        }
    }

    fn transaction_id(&self) -> String {
        let now = Utc::now();
        format!("{}@{}.{:09}", self.operator, now.timestamp(), now.timestamp_subsec_nanos())
    }

    /// Number of collections created
    pub async fn collection_count(&self) -> usize {
        self.state.lock().await.collections.len()
    }

    /// Payloads minted under a collection, in serial order
    pub async fn minted(&self, collection: &CollectionId) -> Vec<Vec<u8>> {
        self.state.lock().await.tokens.get(collection).cloned().unwrap_or_default()
    }

    /// Messages appended to a topic, in sequence order
    pub async fn messages(&self, topic_id: &str) -> Vec<String> {
        self.state.lock().await.topics.get(topic_id).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl TokenService for InMemoryLedger {
    async fn create_collection(&self, spec: &CollectionSpec) -> Result<CollectionId> {
        let mut state = self.state.lock().await;
        let id = CollectionId(format!("{}{}", ENTITY_PREFIX, state.allocate()));
        state.collections.insert(id.clone(), spec.clone());
        state.tokens.insert(id.clone(), Vec::new());
        info!("Created in-memory collection {} ({})", id, spec.symbol);
        Ok(id)
    }

    async fn mint(&self, collection: &CollectionId, payload: Vec<u8>) -> Result<MintReceipt> {
        let transaction_id = self.transaction_id();
        let mut state = self.state.lock().await;
        let tokens = state
            .tokens
            .get_mut(collection)
            .ok_or_else(|| MintError::Ledger(format!("INVALID_TOKEN_ID: {}", collection)))?;
        tokens.push(payload);
        Ok(MintReceipt {
            serial_number: tokens.len() as u64,
            transaction_id,
        })
    }
}

#[async_trait]
impl AuditLog for InMemoryLedger {
    async fn submit(&self, topic_id: &str, message: String) -> Result<AuditReceipt> {
        let transaction_id = self.transaction_id();
        let now = Utc::now();
        let mut state = self.state.lock().await;
        let messages = state.topics.entry(topic_id.to_string()).or_default();
        messages.push(message);
        Ok(AuditReceipt {
            topic_id: topic_id.to_string(),
            transaction_id,
            consensus_timestamp: format!("{}.{:09}", now.timestamp(), now.timestamp_subsec_nanos()),
            sequence_number: messages.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> CollectionSpec {
        CollectionSpec { name: "Analytics Dataset NFTs".to_string(), symbol: "DATASET".to_string() }
    }

    #[tokio::test]
    async fn test_serials_increase_per_collection() {
        let ledger = InMemoryLedger::default();
        let collection = ledger.create_collection(&spec()).await.unwrap();
        assert_eq!(collection.as_str(), "0.0.1001");

        let first = ledger.mint(&collection, b"a".to_vec()).await.unwrap();
        let second = ledger.mint(&collection, b"b".to_vec()).await.unwrap();

        assert_eq!(first.serial_number, 1);
        assert_eq!(second.serial_number, 2);
        assert!(first.transaction_id.starts_with("0.0.2@"));
        assert_eq!(ledger.minted(&collection).await, vec![b"a".to_vec(), b"b".to_vec()]);
    }

    #[tokio::test]
    async fn test_unknown_collection_rejected() {
        let ledger = InMemoryLedger::default();
        let err = ledger.mint(&CollectionId("0.0.9".to_string()), vec![]).await.unwrap_err();
        assert!(err.to_string().contains("INVALID_TOKEN_ID"));
    }

    #[tokio::test]
    async fn test_topic_sequence_numbers() {
        let ledger = InMemoryLedger::default();
        let first = ledger.submit("0.0.5", "one".to_string()).await.unwrap();
        let second = ledger.submit("0.0.5", "two".to_string()).await.unwrap();

        assert_eq!((first.sequence_number, second.sequence_number), (1, 2));
        assert!(second.consensus_timestamp.contains('.'));
        assert_eq!(ledger.messages("0.0.5").await, vec!["one", "two"]);
    }
}
