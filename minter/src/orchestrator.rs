//! Mint orchestration
//!
//! Sequences one mint: ensure the collection exists, compact the metadata,
//! append the optional audit record, mint the token and assemble the result.
//! The audit record is non-critical; every other step is fatal on failure.
//! There is no automatic retry at any step.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{error, info, warn};
use serde::Serialize;

use dataset_anchor_core::metadata::{compact, CompactPayload};
use dataset_anchor_core::{DatasetMetadata, MintResult};

use crate::audit::AuditMessage;
use crate::collection::CollectionRegistry;
use crate::config::{LedgerConfig, Network};
use crate::error::{MintError, Result};
use crate::explorer::{explorer_url, ExplorerKind};
use crate::ledger::{
    AuditLog, AuditReceipt, CollectionId, CollectionSpec, GatewayLedger, InMemoryLedger, TokenService,
};
use crate::tracker::{LedgerOperation, SubmissionTracker};

/// Progress of a single mint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MintState {
    /// Request received
    Idle,

    /// Collection id known
    CollectionReady,

    /// Audit record appended
    AuditSubmitted,

    /// Token minted
    Minted,

    /// Result assembled
    Done,

    /// A fatal step failed
    Error,
}

impl fmt::Display for MintState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What happened to the audit record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditOutcome {
    /// Appended to the topic
    Recorded(AuditReceipt),

    /// No topic configured
    Skipped,

    /// Submission failed; the mint went ahead without it
    Failed(String),
}

impl AuditOutcome {
    /// Receipt, when recorded
    pub fn receipt(&self) -> Option<&AuditReceipt> {
        match self {
            AuditOutcome::Recorded(receipt) => Some(receipt),
            _ => None,
        }
    }
}

/// Successful mint with everything observed along the way
#[derive(Debug, Clone)]
pub struct MintOutcome {
    /// Result returned to the caller
    pub result: MintResult,

    /// Audit record outcome
    pub audit: AuditOutcome,

    /// Payload stored on the token
    pub payload: CompactPayload,

    /// States passed through, in order
    pub states: Vec<MintState>,
}

impl MintOutcome {
    /// Whether the mint succeeded without its audit record although one was wanted
    pub fn is_partial(&self) -> bool {
        matches!(self.audit, AuditOutcome::Failed(_))
    }
}

/// Coordinates collection setup, audit record and mint
pub struct MintOrchestrator {
    /// Token-service collaborator
    tokens: Arc<dyn TokenService>,

    /// Audit-log collaborator
    audit_log: Arc<dyn AuditLog>,

    /// Cached collection id
    registry: Arc<CollectionRegistry>,

    /// Submission record
    tracker: Arc<SubmissionTracker>,

    /// Network for explorer links
    network: Network,

    /// Audit topic, if configured
    audit_topic_id: Option<String>,

    /// Timeout for each ledger call
    request_timeout: Duration,
}

impl fmt::Debug for MintOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MintOrchestrator")
            .field("network", &self.network)
            .field("collection", &self.registry.cached())
            .field("audit_topic_id", &self.audit_topic_id)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl MintOrchestrator {
    /// Create an orchestrator over explicit collaborators
    pub fn new(
        tokens: Arc<dyn TokenService>,
        audit_log: Arc<dyn AuditLog>,
        registry: Arc<CollectionRegistry>,
        config: &LedgerConfig,
    ) -> Self {
        MintOrchestrator {
            tokens,
            audit_log,
            registry,
            tracker: Arc::new(SubmissionTracker::new()),
            network: config.network,
            audit_topic_id: config.audit_topic_id.clone(),
            request_timeout: config.request_timeout,
        }
    }

    /// Build the orchestrator described by `config`
    ///
    /// Fails with [`MintError::MissingCredentials`] before any network call
    /// when credentials are absent, unless the in-process ledger is selected.
    pub fn from_config(config: &LedgerConfig) -> Result<Self> {
        let spec = CollectionSpec {
            name: config.collection_name.clone(),
            symbol: config.collection_symbol.clone(),
        };
        let registry = Arc::new(match &config.collection_id {
            Some(id) => CollectionRegistry::with_existing(spec, CollectionId(id.clone())),
            None => CollectionRegistry::new(spec),
        });

        if config.dry_run {
            let operator = config
                .credentials
                .as_ref()
                .map(|c| c.account_id.clone())
                .unwrap_or_else(|| "0.0.2".to_string());
            warn!("LEDGER_DRY_RUN enabled; minting against the in-process ledger as {}", operator);
            let ledger = Arc::new(InMemoryLedger::new(operator));
            return Ok(Self::new(ledger.clone(), ledger, registry, config));
        }

        let gateway = Arc::new(GatewayLedger::from_config(config)?);
        info!("Minting on {} via the signing gateway", config.network);
        Ok(Self::new(gateway.clone(), gateway, registry, config))
    }

    /// Submission record shared by every mint
    pub fn tracker(&self) -> &Arc<SubmissionTracker> {
        &self.tracker
    }

    /// Cached collection id, if one exists yet
    pub fn collection_id(&self) -> Option<&CollectionId> {
        self.registry.cached()
    }

    /// Network minted on
    pub fn network(&self) -> Network {
        self.network
    }

    /// Whether an audit topic is configured
    pub fn audit_enabled(&self) -> bool {
        self.audit_topic_id.is_some()
    }

    /// Mint one token for `metadata`
    pub async fn mint(&self, metadata: &DatasetMetadata) -> Result<MintOutcome> {
        let mut states = vec![MintState::Idle];
        match self.run(metadata, &mut states).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                let reached = states.last().copied().unwrap_or(MintState::Idle);
                error!(
                    "Mint of {} moved {} -> {}: {}",
                    metadata.file_name,
                    reached,
                    MintState::Error,
                    err
                );
                Err(err)
            }
        }
    }

    async fn run(&self, metadata: &DatasetMetadata, states: &mut Vec<MintState>) -> Result<MintOutcome> {
        if metadata.file_name.trim().is_empty() {
            return Err(MintError::InvalidRequest("metadata.fileName is required".to_string()));
        }
        info!(
            "Minting {} ({} rows, hash {}…)",
            metadata.file_name,
            metadata.row_count,
            metadata.hash.hex_prefix(16)
        );

        let collection = self.ensure_collection().await?;
        states.push(MintState::CollectionReady);

        let payload = compact(metadata)?;

        let audit = self.submit_audit(metadata).await;
        if let AuditOutcome::Recorded(_) = audit {
            states.push(MintState::AuditSubmitted);
        }

        let tokens = Arc::clone(&self.tokens);
        let target = collection.clone();
        let bytes = payload.as_bytes().to_vec();
        let receipt = self
            .tracker
            .track(LedgerOperation::Mint, self.request_timeout, async move {
                tokens.mint(&target, bytes).await
            })
            .await
            .map_err(MintError::into_mint_error)?;
        states.push(MintState::Minted);

        let audit_receipt = audit.receipt();
        let result = MintResult {
            token_id: collection.to_string(),
            serial_number: receipt.serial_number,
            transaction_id: receipt.transaction_id,
            timestamp: Utc::now(),
            explorer_url: explorer_url(self.network, ExplorerKind::Token, collection.as_str()),
            audit_timestamp: audit_receipt.map(|r| r.consensus_timestamp.clone()),
            audit_sequence_number: audit_receipt.map(|r| r.sequence_number),
        };
        states.push(MintState::Done);

        info!(
            "Minted {} serial {} for {}",
            result.token_id, result.serial_number, metadata.file_name
        );
        Ok(MintOutcome { result, audit, payload, states: states.clone() })
    }

    async fn ensure_collection(&self) -> Result<CollectionId> {
        self.registry
            .get_or_create(move || async move {
                // Never start a second creation while an earlier one may still land
                if let Some(submission_id) = self.tracker.unconfirmed_submission(LedgerOperation::CreateCollection) {
                    warn!("Collection creation {} is unconfirmed, not creating another", submission_id);
                    return Err(MintError::Unconfirmed {
                        operation: LedgerOperation::CreateCollection,
                        submission_id,
                    });
                }
                if let Some(id) = self.registry.take_created() {
                    info!("Adopting collection {} from an earlier creation", id);
                    return Ok(id);
                }

                let tokens = Arc::clone(&self.tokens);
                let registry = Arc::clone(&self.registry);
                let spec = self.registry.spec().clone();
                let id = self
                    .tracker
                    .track(LedgerOperation::CreateCollection, self.request_timeout, async move {
                        let id = tokens.create_collection(&spec).await?;
                        registry.record_created(id.clone());
                        Ok(id)
                    })
                    .await?;
                self.registry.take_created();
                Ok(id)
            })
            .await
            .map_err(MintError::into_collection_error)
    }

    async fn submit_audit(&self, metadata: &DatasetMetadata) -> AuditOutcome {
        let Some(topic_id) = self.audit_topic_id.clone() else {
            info!("No audit topic configured, skipping audit record");
            return AuditOutcome::Skipped;
        };

        let message = match AuditMessage::new(metadata, Utc::now()).to_json() {
            Ok(message) => message,
            Err(err) => {
                warn!("Audit record for {} not built (non-critical): {}", metadata.file_name, err);
                return AuditOutcome::Failed(err.to_string());
            }
        };

        let audit_log = Arc::clone(&self.audit_log);
        let submitted = self
            .tracker
            .track(LedgerOperation::Audit, self.request_timeout, async move {
                audit_log.submit(&topic_id, message).await
            })
            .await;

        match submitted {
            Ok(receipt) => {
                info!(
                    "Audit record {} appended to {} at {}",
                    receipt.sequence_number, receipt.topic_id, receipt.consensus_timestamp
                );
                AuditOutcome::Recorded(receipt)
            }
            Err(err) => {
                warn!("Audit submission failed (non-critical): {}", err);
                AuditOutcome::Failed(MintError::Audit(err.to_string()).to_string())
            }
        }
    }
}
