//! HTTP client for dataset validation and minting

use std::time::Duration;

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use dataset_anchor_core::metadata::{DatasetPreview, TokenizationReadiness};
use dataset_anchor_core::models::DatasetStats;
use dataset_anchor_core::{ContentHash, DatasetMetadata, MintResult, ValidationResult};

/// Error type for client operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Service answered with an error status
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message from the service
        message: String,
        /// Diagnostic detail, when provided
        details: Option<String>,
    },

    /// Upload failed validation
    #[error("Dataset is invalid: {}", .0.join("; "))]
    InvalidDataset(Vec<String>),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Answer to a validation request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Validation verdict
    pub validation: ValidationResult,

    /// Metadata, present for valid uploads
    #[serde(default)]
    pub metadata: Option<DatasetMetadata>,

    /// Numeric statistics, present for valid uploads
    #[serde(default)]
    pub stats: Option<DatasetStats>,

    /// Display summary
    pub preview: DatasetPreview,

    /// Readiness verdict, present for valid uploads
    #[serde(default)]
    pub readiness: Option<TokenizationReadiness>,
}

/// Identifying fields echoed back with a mint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintedDataset {
    /// Declared file name
    pub file_name: String,

    /// Row count
    pub row_count: usize,

    /// Fingerprint of the upload
    pub hash: ContentHash,
}

/// Answer to a mint request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintResponse {
    /// Always true on success
    pub success: bool,

    /// Mint outcome
    #[serde(flatten)]
    pub result: MintResult,

    /// Echo of the minted dataset
    pub metadata: MintedDataset,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    details: Option<String>,
}

#[derive(Serialize)]
struct MintRequest<'a> {
    metadata: &'a DatasetMetadata,
}

/// Client for a running Dataset Anchor service
#[derive(Debug, Clone)]
pub struct AnchorClient {
    /// Base URL of the service
    base_url: String,

    /// HTTP client
    client: Client,

    /// Timeout for requests
    timeout: Duration,
}

impl AnchorClient {
    /// Create a new client
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Set the timeout for requests
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Check that the service is up
    pub async fn health(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).timeout(self.timeout).send().await?;
        let body: serde_json::Value = Self::success(response).await?.json().await?;
        Ok(body["status"] == "healthy")
    }

    /// Service status document
    pub async fn status(&self) -> Result<serde_json::Value> {
        let url = format!("{}/status", self.base_url);
        let response = self.client.get(&url).timeout(self.timeout).send().await?;
        Ok(Self::success(response).await?.json().await?)
    }

    /// Upload a CSV file for validation
    pub async fn validate_csv(&self, file_name: &str, contents: Vec<u8>) -> Result<ValidationReport> {
        let url = format!("{}/api/datasets/validate", self.base_url);
        let response = self
            .client
            .post(&url)
            .query(&[("fileName", file_name)])
            .header(reqwest::header::CONTENT_TYPE, "text/csv")
            .timeout(self.timeout)
            .body(contents)
            .send()
            .await?;
        Ok(Self::success(response).await?.json().await?)
    }

    /// Mint a token for validated metadata
    pub async fn mint_dataset(&self, metadata: &DatasetMetadata) -> Result<MintResponse> {
        let url = format!("{}/api/mint-dataset", self.base_url);
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&MintRequest { metadata })
            .send()
            .await?;
        Ok(Self::success(response).await?.json().await?)
    }

    /// Validate a CSV file and mint it when valid
    pub async fn anchor_csv(&self, file_name: &str, contents: Vec<u8>) -> Result<MintResponse> {
        let report = self.validate_csv(file_name, contents).await?;
        match report.metadata {
            Some(metadata) if report.validation.is_valid() => self.mint_dataset(&metadata).await,
            _ => Err(ClientError::InvalidDataset(report.validation.errors().to_vec())),
        }
    }

    async fn success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await?;
        let (message, details) = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => (body.error, body.details),
            Err(_) => (text, None),
        };
        Err(ClientError::Server { status: status.as_u16(), message, details })
    }
}
