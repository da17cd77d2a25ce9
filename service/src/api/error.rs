//! HTTP error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use dataset_anchor_core::CoreError;
use dataset_anchor_minter::MintError;

/// Error body returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Message suitable for display
    pub error: String,

    /// Diagnostic detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Error returned by a request handler
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    /// Client error with a message
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody { error: message.into(), details: None },
        }
    }

    /// Server error with a message
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody { error: message.into(), details: None },
        }
    }

    /// Attach diagnostic detail
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.body.details = Some(details.into());
        self
    }

    /// Map a mint failure: caller mistakes are client errors, everything else is a server error
    pub fn from_mint_error(err: &MintError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        ApiError {
            status,
            body: ErrorBody { error: err.user_message(), details: err.detail() },
        }
    }

    /// HTTP status
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response body
    pub fn body(&self) -> &ErrorBody {
        &self.body
    }
}

impl From<MintError> for ApiError {
    fn from(err: MintError) -> Self {
        ApiError::from_mint_error(&err)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidDataset(_) | CoreError::InvalidPayload(_) => ApiError::bad_request(err.to_string()),
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("Request failed ({}): {}", self.status, self.body.error);
        }
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_missing_credentials_is_server_error_with_details() {
        let err = ApiError::from(MintError::MissingCredentials);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body().error, "Ledger credentials not configured");
        assert!(err.body().details.as_deref().unwrap_or_default().contains("LEDGER_ACCOUNT_ID"));
    }

    #[rstest]
    #[case::invalid_request(MintError::InvalidRequest("metadata.fileName is required".to_string()), StatusCode::BAD_REQUEST)]
    #[case::mint_rejected(MintError::Mint("INSUFFICIENT_PAYER_BALANCE".to_string()), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case::ledger_down(MintError::Ledger("connection refused".to_string()), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_mint_error_status(#[case] err: MintError, #[case] expected: StatusCode) {
        let message = err.user_message();
        let api = ApiError::from(err);
        assert_eq!(api.status(), expected);
        assert_eq!(api.body().error, message);
    }

    #[rstest]
    #[case::invalid_dataset(CoreError::InvalidDataset("no rows".to_string()), StatusCode::BAD_REQUEST)]
    #[case::invalid_payload(CoreError::InvalidPayload("bad base64".to_string()), StatusCode::BAD_REQUEST)]
    #[case::config(config_error(), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_core_error_status(#[case] err: CoreError, #[case] expected: StatusCode) {
        assert_eq!(ApiError::from(err).status(), expected);
    }

    fn config_error() -> CoreError {
        dataset_anchor_core::error::to_config_error("max_file_size must be positive")
    }

    #[test]
    fn test_details_omitted_when_absent() {
        let json = serde_json::to_value(ApiError::bad_request("Missing metadata in request body").body()).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Missing metadata in request body" }));
    }
}
