//! Validation result for an uploaded document

use serde::{Serialize, Deserialize};

use crate::crypto::ContentHash;
use super::row::Row;

/// Outcome of validating one upload
///
/// Validity is derived from the error list at construction time: any error
/// makes the result invalid, warnings never do. Counts and column names are
/// populated even for invalid uploads so callers can show partial feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    is_valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
    row_count: usize,
    column_count: usize,
    columns: Vec<String>,
    sample_data: Vec<Row>,
    hash: ContentHash,
    estimated_size: u64,
}

impl ValidationResult {
    /// Assemble a result; validity is computed from `errors`
    pub fn new(
        errors: Vec<String>,
        warnings: Vec<String>,
        row_count: usize,
        columns: Vec<String>,
        sample_data: Vec<Row>,
        hash: ContentHash,
        estimated_size: u64,
    ) -> Self {
        ValidationResult {
            is_valid: errors.is_empty(),
            column_count: columns.len(),
            errors,
            warnings,
            row_count,
            columns,
            sample_data,
            hash,
            estimated_size,
        }
    }

    /// Whether the upload may proceed to inference and minting
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Blocking problems, in rule order
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Non-blocking observations, in rule order
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Number of parsed data rows (before any row cap)
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of header columns
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Header column names in file order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Preview rows in original order
    pub fn sample_data(&self) -> &[Row] {
        &self.sample_data
    }

    /// Fingerprint of the raw upload
    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }

    /// Upload size in bytes
    pub fn estimated_size(&self) -> u64 {
        self.estimated_size
    }
}
