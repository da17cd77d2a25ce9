//! Display summary of an upload

use serde::{Deserialize, Serialize};

use crate::models::{Row, ValidationResult};
use crate::utils::format_kilobytes;

/// Human-readable summary shown before minting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetPreview {
    /// Declared file name
    pub file_name: String,

    /// Size formatted as `X.XX KB`
    pub file_size: String,

    /// Row count
    pub row_count: usize,

    /// Column count
    pub column_count: usize,

    /// Header column names
    pub columns: Vec<String>,

    /// Leading rows
    pub sample_rows: Vec<Row>,
}

/// Build the preview for a validated upload
pub fn generate_preview(file_name: &str, validation: &ValidationResult) -> DatasetPreview {
    DatasetPreview {
        file_name: file_name.to_string(),
        file_size: format_kilobytes(validation.estimated_size()),
        row_count: validation.row_count(),
        column_count: validation.column_count(),
        columns: validation.columns().to_vec(),
        sample_rows: validation.sample_data().to_vec(),
    }
}
