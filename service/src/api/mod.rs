//! HTTP routes
//!
//! `POST /api/datasets/validate` runs an upload through the ingest pipeline
//! and `POST /api/mint-dataset` anchors previously built metadata on the
//! ledger. `GET /health` and `GET /status` report liveness and configuration.

mod error;

pub use error::ApiError;

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, DefaultBodyLimit, Query, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use dataset_anchor_core::metadata::{DatasetPreview, TokenizationReadiness};
use dataset_anchor_core::models::DatasetStats;
use dataset_anchor_core::{
    ContentHash, CoreError, DatasetMetadata, IngestLimits, MintResult, PreparedDataset, RawDocument,
    ValidationResult,
};
use dataset_anchor_minter::tracker::{SubmissionRecord, TrackerSummary};
use dataset_anchor_minter::Network;

use crate::state::AppState;

/// File name used when the upload does not declare one
const DEFAULT_FILE_NAME: &str = "upload.csv";

/// Build the full application router
pub fn create_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    let api = Router::new()
        .route("/mint-dataset", post(mint_dataset))
        .route("/datasets/validate", post(validate_dataset));

    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(status))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

/// Minting availability and submission counts
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MintingStatus {
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    collection_id: Option<String>,
    audit_enabled: bool,
    submissions: TrackerSummary,
    unconfirmed: Vec<SubmissionRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    uptime_secs: u64,
    network: Network,
    limits: IngestLimits,
    minting: MintingStatus,
}

async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let minting = match state.minter() {
        Ok(orchestrator) => MintingStatus {
            enabled: true,
            reason: None,
            collection_id: orchestrator.collection_id().map(|id| id.to_string()),
            audit_enabled: orchestrator.audit_enabled(),
            submissions: orchestrator.tracker().summary(),
            unconfirmed: orchestrator.tracker().unconfirmed(),
        },
        Err(err) => MintingStatus {
            enabled: false,
            reason: Some(err.body().error.clone()),
            collection_id: None,
            audit_enabled: false,
            submissions: TrackerSummary::default(),
            unconfirmed: Vec::new(),
        },
    };

    Json(StatusResponse {
        status: "operational",
        service: "dataset-anchor",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
        network: state.network,
        limits: state.pipeline.limits().clone(),
        minting,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateQuery {
    file_name: Option<String>,
}

/// Validation verdict plus everything derived from a valid upload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateResponse {
    validation: ValidationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<DatasetMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<DatasetStats>,
    preview: DatasetPreview,
    #[serde(skip_serializing_if = "Option::is_none")]
    readiness: Option<TokenizationReadiness>,
}

/// Validate a raw CSV upload
///
/// Invalid uploads are still answered with 200; the verdict is in `validation`.
async fn validate_dataset(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ValidateQuery>,
    body: Bytes,
) -> Result<Json<ValidateResponse>, ApiError> {
    let file_name = query
        .file_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());
    let document = RawDocument::new(file_name, body.to_vec());

    let worker = Arc::clone(&state);
    let (ingestion, prepared) = tokio::task::spawn_blocking(move || {
        let ingestion = worker.pipeline.ingest(&document);
        let prepared = if ingestion.is_valid() {
            Some(worker.pipeline.prepare(&ingestion)?)
        } else {
            None
        };
        Ok::<_, CoreError>((ingestion, prepared))
    })
    .await
    .map_err(|err| ApiError::internal(format!("Validation task failed: {}", err)))??;

    let preview = ingestion.preview();
    let (metadata, stats, readiness) = match prepared {
        Some(PreparedDataset { metadata, stats, readiness }) => (Some(metadata), Some(stats), Some(readiness)),
        None => (None, None, None),
    };

    Ok(Json(ValidateResponse {
        validation: ingestion.validation,
        metadata,
        stats,
        preview,
        readiness,
    }))
}

#[derive(Debug, Deserialize)]
struct MintRequest {
    metadata: Option<DatasetMetadata>,
}

/// Identifying fields echoed back with a mint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MintedDataset {
    file_name: String,
    row_count: usize,
    hash: ContentHash,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MintResponse {
    success: bool,
    #[serde(flatten)]
    result: MintResult,
    metadata: MintedDataset,
}

/// Mint a token for previously validated metadata
async fn mint_dataset(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MintRequest>, JsonRejection>,
) -> Result<Json<MintResponse>, ApiError> {
    let Json(request) = payload
        .map_err(|rejection| ApiError::bad_request("Invalid request body").with_details(rejection.body_text()))?;
    let metadata = request
        .metadata
        .ok_or_else(|| ApiError::bad_request("Missing metadata in request body"))?;

    let orchestrator = state.minter()?;
    info!("Mint requested for {} ({} rows)", metadata.file_name, metadata.row_count);

    let outcome = orchestrator.mint(&metadata).await?;
    if outcome.is_partial() {
        warn!("{} minted without its audit record", metadata.file_name);
    }

    Ok(Json(MintResponse {
        success: true,
        result: outcome.result,
        metadata: MintedDataset {
            file_name: metadata.file_name,
            row_count: metadata.row_count,
            hash: metadata.hash,
        },
    }))
}
