//! Error types for the core crate
//!
//! Input problems with an uploaded file are never errors here: they are
//! collected into [`crate::models::ValidationResult`]. This type covers the
//! failures that abort a stage outright.

use thiserror::Error;
use std::io;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Compacted on-chain payload still exceeds the ledger ceiling
    #[error("Metadata too large: {size} bytes exceeds {limit} byte limit")]
    PayloadTooLarge {
        /// Size of the smallest payload that could be produced
        size: usize,
        /// Ledger-imposed ceiling
        limit: usize,
    },

    /// Malformed compacted payload
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// A downstream stage was asked to run on an invalid upload
    #[error("Dataset failed validation: {0}")]
    InvalidDataset(String),

    /// Data serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// CSV tokenizer error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Hex decoding error
    #[error("Hex decoding error: {0}")]
    HexError(#[from] hex::FromHexError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for the core crate
pub type Result<T> = std::result::Result<T, CoreError>;

/// Convert a string error to a SerializationError
pub fn to_serialization_error<E: std::fmt::Display>(err: E) -> CoreError {
    CoreError::SerializationError(err.to_string())
}

/// Convert a string error to a ConfigError
pub fn to_config_error<E: std::fmt::Display>(err: E) -> CoreError {
    CoreError::ConfigError(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let core_err: CoreError = io_err.into();
        match core_err {
            CoreError::IoError(_) => {}
            _ => panic!("Expected IoError variant"),
        }

        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let core_err: CoreError = json_err.into();
        match core_err {
            CoreError::JsonError(_) => {}
            _ => panic!("Expected JsonError variant"),
        }

        let core_err = to_config_error("missing limits");
        match core_err {
            CoreError::ConfigError(msg) => assert_eq!(msg, "missing limits"),
            _ => panic!("Expected ConfigError variant"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = CoreError::PayloadTooLarge { size: 120, limit: 100 };
        assert_eq!(err.to_string(), "Metadata too large: 120 bytes exceeds 100 byte limit");

        let err = CoreError::InvalidDataset("File is empty".to_string());
        assert_eq!(err.to_string(), "Dataset failed validation: File is empty");
    }
}
