//! Ledger configuration
//!
//! Read from the process environment. Credentials are optional at load time
//! so that validation-only deployments can start; minting without them fails
//! with [`MintError::MissingCredentials`] before any network call.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MintError, Result};

/// Default timeout for a single ledger call
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default collection name
pub const DEFAULT_COLLECTION_NAME: &str = "Analytics Dataset NFTs";

/// Default collection symbol
pub const DEFAULT_COLLECTION_SYMBOL: &str = "DATASET";

/// Ledger network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Public test network
    #[default]
    Testnet,

    /// Production network
    Mainnet,

    /// Preview network
    Previewnet,
}

impl Network {
    /// Lowercase network name
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
            Network::Previewnet => "previewnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = MintError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            "previewnet" => Ok(Network::Previewnet),
            other => Err(MintError::Config(format!("unknown ledger network: {}", other))),
        }
    }
}

/// Operator account and signing key
#[derive(Clone, PartialEq, Eq)]
pub struct LedgerCredentials {
    /// Operator account id, e.g. `0.0.1234`
    pub account_id: String,

    /// Operator private key
    pub private_key: String,
}

impl fmt::Debug for LedgerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerCredentials")
            .field("account_id", &self.account_id)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Ledger configuration
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Network the collection lives on
    pub network: Network,

    /// Operator credentials, if configured
    pub credentials: Option<LedgerCredentials>,

    /// Audit-log topic; audit submission is skipped when unset
    pub audit_topic_id: Option<String>,

    /// Base URL of the signing gateway
    pub gateway_url: Option<String>,

    /// Existing collection to mint under instead of creating one
    pub collection_id: Option<String>,

    /// Name used when creating the collection
    pub collection_name: String,

    /// Symbol used when creating the collection
    pub collection_symbol: String,

    /// Timeout for a single ledger call
    pub request_timeout: Duration,

    /// Use the in-process ledger instead of the gateway
    pub dry_run: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            network: Network::Testnet,
            credentials: None,
            audit_topic_id: None,
            gateway_url: None,
            collection_id: None,
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            collection_symbol: DEFAULT_COLLECTION_SYMBOL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            dry_run: false,
        }
    }
}

impl LedgerConfig {
    /// Load from the process environment, after reading `.env` if present
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = LedgerConfig::default();

        if let Some(network) = get("LEDGER_NETWORK") {
            config.network = network.parse()?;
        }

        config.credentials = match (get("LEDGER_ACCOUNT_ID"), get("LEDGER_PRIVATE_KEY")) {
            (Some(account_id), Some(private_key)) => Some(LedgerCredentials { account_id, private_key }),
            _ => None,
        };

        config.audit_topic_id = get("AUDIT_TOPIC_ID");
        config.gateway_url = get("LEDGER_GATEWAY_URL");
        config.collection_id = get("LEDGER_COLLECTION_ID");

        if let Some(name) = get("LEDGER_COLLECTION_NAME") {
            config.collection_name = name;
        }
        if let Some(symbol) = get("LEDGER_COLLECTION_SYMBOL") {
            config.collection_symbol = symbol;
        }

        if let Some(secs) = get("LEDGER_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|e| MintError::Config(format!("LEDGER_TIMEOUT_SECS: {}", e)))?;
            if secs == 0 {
                return Err(MintError::Config("LEDGER_TIMEOUT_SECS must be positive".to_string()));
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(flag) = get("LEDGER_DRY_RUN") {
            config.dry_run = matches!(flag.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }

    /// Credentials, or [`MintError::MissingCredentials`]
    pub fn require_credentials(&self) -> Result<&LedgerCredentials> {
        self.credentials.as_ref().ok_or(MintError::MissingCredentials)
    }

    /// Whether audit submission is configured
    pub fn audit_enabled(&self) -> bool {
        self.audit_topic_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = LedgerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.network, Network::Testnet);
        assert!(config.credentials.is_none());
        assert!(!config.audit_enabled());
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.collection_symbol, "DATASET");
        assert!(matches!(config.require_credentials(), Err(MintError::MissingCredentials)));
    }

    #[test]
    fn test_full_environment() {
        let config = LedgerConfig::from_lookup(lookup(&[
            ("LEDGER_ACCOUNT_ID", "0.0.1234"),
            ("LEDGER_PRIVATE_KEY", "302e0201"),
            ("LEDGER_NETWORK", "Mainnet"),
            ("AUDIT_TOPIC_ID", "0.0.999"),
            ("LEDGER_GATEWAY_URL", "http://localhost:7546"),
            ("LEDGER_TIMEOUT_SECS", "5"),
            ("LEDGER_DRY_RUN", "true"),
        ]))
        .unwrap();

        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(config.require_credentials().unwrap().account_id, "0.0.1234");
        assert_eq!(config.audit_topic_id.as_deref(), Some("0.0.999"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(config.dry_run);
    }

    #[test]
    fn test_partial_or_blank_credentials_are_missing() {
        let config = LedgerConfig::from_lookup(lookup(&[("LEDGER_ACCOUNT_ID", "0.0.1")])).unwrap();
        assert!(config.credentials.is_none());

        let config = LedgerConfig::from_lookup(lookup(&[
            ("LEDGER_ACCOUNT_ID", "0.0.1"),
            ("LEDGER_PRIVATE_KEY", "   "),
            ("AUDIT_TOPIC_ID", ""),
        ]))
        .unwrap();
        assert!(config.credentials.is_none());
        assert!(!config.audit_enabled());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(LedgerConfig::from_lookup(lookup(&[("LEDGER_NETWORK", "devnet")])).is_err());
        assert!(LedgerConfig::from_lookup(lookup(&[("LEDGER_TIMEOUT_SECS", "0")])).is_err());
        assert!(LedgerConfig::from_lookup(lookup(&[("LEDGER_TIMEOUT_SECS", "soon")])).is_err());
    }

    #[test]
    fn test_credentials_debug_redacts_key() {
        let credentials = LedgerCredentials {
            account_id: "0.0.1".to_string(),
            private_key: "secret".to_string(),
        };
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("0.0.1"));
    }
}
