//! Shared application state

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use dataset_anchor_core::IngestPipeline;
use dataset_anchor_minter::{LedgerConfig, MintError, MintOrchestrator, Network};

use crate::api::ApiError;

/// State shared by every request handler
pub struct AppState {
    /// Parser, validator and limits
    pub pipeline: IngestPipeline,

    /// Mint orchestrator, or the reason minting is unavailable
    minter: Result<Arc<MintOrchestrator>, MintError>,

    /// Network minted on
    pub network: Network,

    /// Service start time
    pub started_at: Instant,
}

impl AppState {
    /// Build state from ledger configuration
    ///
    /// A ledger configuration problem does not stop the service; validation
    /// keeps working and mint requests report the problem.
    pub fn new(pipeline: IngestPipeline, ledger: &LedgerConfig) -> Self {
        let minter = MintOrchestrator::from_config(ledger).map(Arc::new);
        match &minter {
            Ok(orchestrator) => info!("Minting enabled: {:?}", orchestrator),
            Err(err) => warn!("Minting disabled: {}", err),
        }
        AppState {
            pipeline,
            minter,
            network: ledger.network,
            started_at: Instant::now(),
        }
    }

    /// Orchestrator, or the configuration error that disabled minting
    pub fn minter(&self) -> Result<&Arc<MintOrchestrator>, ApiError> {
        self.minter.as_ref().map_err(ApiError::from_mint_error)
    }
}
