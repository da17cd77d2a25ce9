//! Error types for mint orchestration
//!
//! Every failure that reaches a caller carries a message fit for display and
//! an optional technical detail for diagnostics.

use thiserror::Error;
use uuid::Uuid;

use dataset_anchor_core::CoreError;

use crate::tracker::LedgerOperation;

/// Result type for the minter
pub type Result<T> = std::result::Result<T, MintError>;

/// Error type for the minter
#[derive(Debug, Error)]
pub enum MintError {
    /// Ledger account id or key is not configured
    #[error("Ledger credentials not configured")]
    MissingCredentials,

    /// Any other configuration problem
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request could not be acted on
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Metadata could not be compacted or was rejected by the core pipeline
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Creating the token collection failed
    #[error("Token collection creation failed: {0}")]
    CollectionCreation(String),

    /// The mint transaction failed
    #[error("Token mint failed: {0}")]
    Mint(String),

    /// Audit-log submission failed
    #[error("Audit log submission failed: {0}")]
    Audit(String),

    /// Transport-level ledger failure
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// The request reached the ledger but no answer came back in time,
    /// so whether it took effect is unknown
    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        /// Operation that timed out
        operation: LedgerOperation,
        /// Timeout applied
        seconds: u64,
    },

    /// A transaction was submitted but its outcome was not observed in time
    #[error("{operation} submitted as {submission_id} but no confirmation was observed")]
    Unconfirmed {
        /// Operation whose outcome is unknown
        operation: LedgerOperation,
        /// Tracker id of the submission
        submission_id: Uuid,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MintError {
    /// Whether the error is an operator configuration problem
    pub fn is_config(&self) -> bool {
        matches!(self, MintError::MissingCredentials | MintError::Config(_))
    }

    /// Whether the caller sent something unusable
    pub fn is_client_error(&self) -> bool {
        matches!(self, MintError::InvalidRequest(_))
    }

    /// Message suitable for direct display
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Optional technical detail for diagnostics
    pub fn detail(&self) -> Option<String> {
        match self {
            MintError::MissingCredentials => Some(
                "Set LEDGER_ACCOUNT_ID and LEDGER_PRIVATE_KEY in the environment".to_string(),
            ),
            MintError::Unconfirmed { submission_id, .. } => Some(format!(
                "Submission {} may still settle on the ledger; check it before retrying",
                submission_id
            )),
            MintError::Core(CoreError::PayloadTooLarge { .. }) => {
                Some("The compacted on-chain payload exceeds the ledger limit".to_string())
            }
            _ => None,
        }
    }

    /// Wrap a ledger failure as a collection-creation error, keeping tracker outcomes as-is
    pub(crate) fn into_collection_error(self) -> MintError {
        match self {
            MintError::Timeout { .. } | MintError::Unconfirmed { .. } | MintError::CollectionCreation(_) => self,
            other => MintError::CollectionCreation(other.to_string()),
        }
    }

    /// Wrap a ledger failure as a mint error, keeping tracker outcomes as-is
    pub(crate) fn into_mint_error(self) -> MintError {
        match self {
            MintError::Timeout { .. } | MintError::Unconfirmed { .. } | MintError::Mint(_) => self,
            other => MintError::Mint(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for MintError {
    fn from(err: reqwest::Error) -> Self {
        MintError::Ledger(err.to_string())
    }
}

/// Helper function to convert string errors to MintError
pub fn to_ledger_error<E: ToString>(err: E) -> MintError {
    MintError::Ledger(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_is_config() {
        let err = MintError::MissingCredentials;
        assert!(err.is_config());
        assert!(!err.is_client_error());
        assert_eq!(err.user_message(), "Ledger credentials not configured");
        assert!(err.detail().unwrap().contains("LEDGER_ACCOUNT_ID"));
    }

    #[test]
    fn test_wrapping_keeps_tracker_outcomes() {
        let id = Uuid::new_v4();
        let err = MintError::Unconfirmed { operation: LedgerOperation::Mint, submission_id: id }
            .into_mint_error();
        assert!(matches!(err, MintError::Unconfirmed { .. }));

        let err = MintError::Ledger("gateway returned 502".to_string()).into_mint_error();
        assert_eq!(err.to_string(), "Token mint failed: Ledger error: gateway returned 502");

        let err = MintError::Ledger("boom".to_string()).into_collection_error();
        assert_eq!(err.to_string(), "Token collection creation failed: Ledger error: boom");
    }

    #[test]
    fn test_core_errors_are_transparent() {
        let err: MintError = CoreError::PayloadTooLarge { size: 120, limit: 100 }.into();
        assert_eq!(err.to_string(), "Metadata too large: 120 bytes exceeds 100 byte limit");
        assert!(err.detail().is_some());
    }
}
