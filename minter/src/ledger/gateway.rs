//! HTTP signing-gateway ledger client
//!
//! The gateway holds the ledger SDK connection and submits transactions on
//! behalf of the operator account. Every request body is signed with
//! HMAC-SHA256 under the operator key.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use log::{debug, error, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::{AuditLog, AuditReceipt, CollectionId, CollectionSpec, MintReceipt, TokenService};
use crate::config::{LedgerConfig, LedgerCredentials};
use crate::error::{to_ledger_error, MintError, Result};
use crate::tracker::LedgerOperation;

/// Header carrying the operator account id
pub const ACCOUNT_HEADER: &str = "X-Operator-Account";

/// Header carrying the hex HMAC of the request body
pub const SIGNATURE_HEADER: &str = "X-Signature";

/// API response wrapper
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiResponse<T> {
    Success(T),
    Error { error: String },
}

/// Request for creating a collection
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTokenRequest<'a> {
    name: &'a str,
    symbol: &'a str,
    token_type: &'static str,
    supply_type: &'static str,
    decimals: u32,
    initial_supply: u64,
    treasury_account_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTokenResponse {
    token_id: String,
}

/// Request for minting; metadata entries are base64
#[derive(Debug, Serialize)]
struct MintRequest {
    metadata: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MintResponse {
    serial_numbers: Vec<u64>,
    transaction_id: String,
}

#[derive(Debug, Serialize)]
struct TopicMessageRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopicMessageResponse {
    transaction_id: String,
    consensus_timestamp: String,
    sequence_number: u64,
}

/// Ledger client speaking to a signing gateway
#[derive(Debug, Clone)]
pub struct GatewayLedger {
    /// Base URL of the gateway
    base_url: String,

    /// HTTP client for making requests
    client: Client,

    /// Operator credentials
    credentials: LedgerCredentials,

    /// Timeout for requests
    timeout: Duration,
}

impl GatewayLedger {
    /// Create a gateway client
    pub fn new(base_url: &str, credentials: LedgerCredentials) -> Self {
        GatewayLedger {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            credentials,
            timeout: Duration::from_secs(30),
        }
    }

    /// Build from configuration; credentials and gateway URL are required
    pub fn from_config(config: &LedgerConfig) -> Result<Self> {
        let credentials = config.require_credentials()?.clone();
        let base_url = config
            .gateway_url
            .as_deref()
            .ok_or_else(|| MintError::Config("LEDGER_GATEWAY_URL must be set unless LEDGER_DRY_RUN is enabled".to_string()))?;
        Ok(Self::new(base_url, credentials).with_timeout(config.request_timeout))
    }

    /// Set the timeout for requests
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Hex HMAC-SHA256 of `body` under the operator key
    fn sign(&self, body: &[u8]) -> Result<String> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.credentials.private_key.as_bytes())
            .map_err(|e| MintError::Config(format!("invalid operator key: {}", e)))?;
        mac.update(body);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    async fn post<B, R>(&self, operation: LedgerOperation, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let payload = serde_json::to_vec(body)?;
        let signature = self.sign(&payload)?;
        debug!("{} via {}", operation, url);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(ACCOUNT_HEADER, &self.credentials.account_id)
            .header(SIGNATURE_HEADER, signature)
            .body(payload)
            .send()
            .await
            .map_err(|e| self.transport_error(operation, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = match response.text().await {
                Ok(text) => text,
                Err(e) if e.is_timeout() => return Err(self.transport_error(operation, e)),
                Err(_) => "Unable to read error response".to_string(),
            };
            error!("{} rejected by gateway: {} - {}", operation, status, text);
            return Err(MintError::Ledger(format!("Gateway error: {} - {}", status, text)));
        }

        let data: ApiResponse<R> = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(operation, e)
            } else {
                MintError::Ledger(format!("Failed to parse gateway response: {}", e))
            }
        })?;

        match data {
            ApiResponse::Success(data) => Ok(data),
            ApiResponse::Error { error } => Err(MintError::Ledger(format!("Gateway error: {}", error))),
        }
    }

    /// A connect failure never reached the gateway. Any other timeout may have,
    /// so it is reported as [`MintError::Timeout`] and left unconfirmed.
    fn transport_error(&self, operation: LedgerOperation, err: reqwest::Error) -> MintError {
        if err.is_timeout() && !err.is_connect() {
            warn!("{} sent but no answer within {:?}", operation, self.timeout);
            MintError::Timeout { operation, seconds: self.timeout.as_secs() }
        } else {
            to_ledger_error(err)
        }
    }
}

#[async_trait]
impl TokenService for GatewayLedger {
    async fn create_collection(&self, spec: &CollectionSpec) -> Result<CollectionId> {
        let request = CreateTokenRequest {
            name: &spec.name,
            symbol: &spec.symbol,
            token_type: "NON_FUNGIBLE_UNIQUE",
            supply_type: "INFINITE",
            decimals: 0,
            initial_supply: 0,
            treasury_account_id: &self.credentials.account_id,
        };
        let response: CreateTokenResponse = self
            .post(LedgerOperation::CreateCollection, "/api/v1/tokens", &request)
            .await?;
        Ok(CollectionId(response.token_id))
    }

    async fn mint(&self, collection: &CollectionId, payload: Vec<u8>) -> Result<MintReceipt> {
        let request = MintRequest { metadata: vec![STANDARD.encode(&payload)] };
        let path = format!("/api/v1/tokens/{}/mint", collection);
        let response: MintResponse = self.post(LedgerOperation::Mint, &path, &request).await?;

        let serial_number = response
            .serial_numbers
            .first()
            .copied()
            .ok_or_else(|| MintError::Ledger("mint response carried no serial number".to_string()))?;
        Ok(MintReceipt { serial_number, transaction_id: response.transaction_id })
    }
}

#[async_trait]
impl AuditLog for GatewayLedger {
    async fn submit(&self, topic_id: &str, message: String) -> Result<AuditReceipt> {
        let path = format!("/api/v1/topics/{}/messages", topic_id);
        let request = TopicMessageRequest { message: &message };
        let response: TopicMessageResponse = self.post(LedgerOperation::Audit, &path, &request).await?;

        Ok(AuditReceipt {
            topic_id: topic_id.to_string(),
            transaction_id: response.transaction_id,
            consensus_timestamp: response.consensus_timestamp,
            sequence_number: response.sequence_number,
        })
    }
}
