//! Dataset metadata construction

use chrono::{DateTime, SubsecRound, Utc};
use log::debug;

use crate::error::{CoreError, Result};
use crate::models::{DatasetMetadata, DatasetSummary, ParsedTable, ValidationResult};
use crate::schema::infer_schema;

/// Build metadata for a validated upload, stamped with the current time
pub fn create_metadata(
    file_name: &str,
    validation: &ValidationResult,
    table: &ParsedTable,
) -> Result<DatasetMetadata> {
    create_metadata_at(file_name, validation, table, Utc::now())
}

/// Build metadata with an explicit upload time
///
/// The fingerprint is taken from `validation` as-is. Invalid uploads are
/// rejected so that nothing downstream of validation runs on them.
pub fn create_metadata_at(
    file_name: &str,
    validation: &ValidationResult,
    table: &ParsedTable,
    upload_date: DateTime<Utc>,
) -> Result<DatasetMetadata> {
    if !validation.is_valid() {
        return Err(CoreError::InvalidDataset(validation.errors().join("; ")));
    }

    let total_rows = validation.row_count();
    let valid_rows = table
        .rows
        .iter()
        .filter(|row| row.has_any_value())
        .count()
        .min(total_rows);

    let metadata = DatasetMetadata {
        file_name: file_name.to_string(),
        upload_date: upload_date.trunc_subsecs(3),
        hash: *validation.hash(),
        row_count: total_rows,
        columns: validation.columns().to_vec(),
        schema: infer_schema(table),
        summary: DatasetSummary {
            total_rows,
            valid_rows,
            invalid_rows: total_rows - valid_rows,
        },
    };

    debug!(
        "Built metadata for {}: {} rows, {} valid",
        metadata.file_name, total_rows, valid_rows
    );
    Ok(metadata)
}
