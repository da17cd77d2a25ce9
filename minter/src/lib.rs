//! Dataset Anchor minter
//!
//! Anchors compacted dataset metadata on the ledger as a token in a reusable
//! collection, with an optional audit-log record of the full fingerprint.

// Error types and result
pub mod error;
pub use error::{MintError, Result};

// Configuration
pub mod config;
pub use config::{LedgerConfig, LedgerCredentials, Network};

// Ledger collaborators
pub mod ledger;
pub use ledger::{AuditLog, CollectionId, GatewayLedger, InMemoryLedger, TokenService};

// Collection cache and submission tracking
pub mod collection;
pub mod tracker;
pub use collection::CollectionRegistry;
pub use tracker::{LedgerOperation, SubmissionStatus, SubmissionTracker};

// Audit record and explorer links
pub mod audit;
pub mod explorer;

// Orchestration
pub mod orchestrator;
pub use orchestrator::{AuditOutcome, MintOrchestrator, MintOutcome, MintState};
