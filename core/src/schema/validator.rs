//! Upload validation
//!
//! Every rule runs on every upload; nothing short-circuits, so the caller
//! always receives the complete list of problems.

use std::collections::HashSet;
use thiserror::Error;
use log::debug;

use crate::config::IngestLimits;
use crate::crypto::ContentHash;
use crate::models::{ParsedTable, RawDocument, ValidationResult};
use crate::tabular::ParseOutcome;
use crate::utils::{format_limit_megabytes, format_megabytes};

/// Whether an issue blocks the upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Makes the upload invalid
    Error,

    /// Reported only
    Warning,
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationIssue {
    /// File exceeds the size limit
    #[error("File size {size}MB exceeds limit of {limit}MB")]
    FileTooLarge {
        /// Actual size, formatted in MB
        size: String,
        /// Limit, formatted in MB
        limit: String,
    },

    /// Zero-byte upload
    #[error("File is empty")]
    EmptyFile,

    /// Tokenizer failure
    #[error("{0}")]
    Parse(String),

    /// No data rows after the header
    #[error("CSV file contains no data rows")]
    NoDataRows,

    /// More rows than are processed downstream
    #[error("File has {rows} rows. Only first {max} will be processed to maintain reasonable transaction costs on the ledger.")]
    TooManyRows {
        /// Parsed row count
        rows: usize,
        /// Row cap
        max: usize,
    },

    /// Header has no columns
    #[error("No columns detected in CSV header")]
    NoColumns,

    /// Unusually wide header
    #[error("File has {0} columns. This may impact metadata size and token creation costs.")]
    TooManyColumns(usize),

    /// Repeated header names, each listed once
    #[error("Duplicate column names detected: {}", .0.join(", "))]
    DuplicateColumns(Vec<String>),

    /// Rows with no values at all
    #[error("Found {0} empty rows that will be skipped")]
    EmptyRows(usize),

    /// Columns missing values in most rows
    #[error("Columns with >{percent}% missing values: {}", .columns.join(", "))]
    SparseColumns {
        /// Threshold as a whole percentage
        percent: u32,
        /// Offending columns in header order
        columns: Vec<String>,
    },
}

impl ValidationIssue {
    /// Severity of this issue
    pub fn severity(&self) -> Severity {
        match self {
            ValidationIssue::FileTooLarge { .. }
            | ValidationIssue::EmptyFile
            | ValidationIssue::Parse(_)
            | ValidationIssue::NoDataRows
            | ValidationIssue::NoColumns
            | ValidationIssue::DuplicateColumns(_) => Severity::Error,
            ValidationIssue::TooManyRows { .. }
            | ValidationIssue::TooManyColumns(_)
            | ValidationIssue::EmptyRows(_)
            | ValidationIssue::SparseColumns { .. } => Severity::Warning,
        }
    }
}

/// Dataset validator
#[derive(Debug, Clone, Default)]
pub struct DatasetValidator {
    limits: IngestLimits,
}

impl DatasetValidator {
    /// Create a validator with the given limits
    pub fn new(limits: IngestLimits) -> Self {
        DatasetValidator { limits }
    }

    /// Limits in force
    pub fn limits(&self) -> &IngestLimits {
        &self.limits
    }

    /// Run every rule, in order, and collect the findings
    pub fn check(&self, document: &RawDocument, outcome: &ParseOutcome) -> Vec<ValidationIssue> {
        let table = &outcome.table;
        let mut issues = Vec::new();

        let size = document.size();
        if size > self.limits.max_file_size {
            issues.push(ValidationIssue::FileTooLarge {
                size: format_megabytes(size),
                limit: format_limit_megabytes(self.limits.max_file_size),
            });
        }
        if size == 0 {
            issues.push(ValidationIssue::EmptyFile);
        }

        issues.extend(outcome.issues.iter().cloned().map(ValidationIssue::Parse));

        let rows = table.row_count();
        if rows == 0 {
            issues.push(ValidationIssue::NoDataRows);
        } else if rows > self.limits.max_rows {
            issues.push(ValidationIssue::TooManyRows { rows, max: self.limits.max_rows });
        }

        let columns = table.column_count();
        if columns == 0 {
            issues.push(ValidationIssue::NoColumns);
        } else if columns > self.limits.max_columns {
            issues.push(ValidationIssue::TooManyColumns(columns));
        }

        let duplicates = duplicate_columns(&table.columns);
        if !duplicates.is_empty() {
            issues.push(ValidationIssue::DuplicateColumns(duplicates));
        }

        let empty_rows = table.rows.iter().filter(|row| row.is_blank()).count();
        if empty_rows > 0 {
            issues.push(ValidationIssue::EmptyRows(empty_rows));
        }

        let sparse = self.sparse_columns(table);
        if !sparse.is_empty() {
            issues.push(ValidationIssue::SparseColumns {
                percent: (self.limits.missing_value_ratio * 100.0).round() as u32,
                columns: sparse,
            });
        }

        issues
    }

    /// Validate an upload whose fingerprint has already been computed
    pub fn validate(
        &self,
        document: &RawDocument,
        outcome: &ParseOutcome,
        hash: ContentHash,
    ) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        for issue in self.check(document, outcome) {
            match issue.severity() {
                Severity::Error => errors.push(issue.to_string()),
                Severity::Warning => warnings.push(issue.to_string()),
            }
        }

        debug!(
            "Validated {}: {} errors, {} warnings",
            document.name(),
            errors.len(),
            warnings.len()
        );

        let table = &outcome.table;
        let sample = table.rows.iter().take(self.limits.preview_rows).cloned().collect();

        ValidationResult::new(
            errors,
            warnings,
            table.row_count(),
            table.columns.clone(),
            sample,
            hash,
            document.size(),
        )
    }

    /// Columns whose missing-value count exceeds the configured ratio
    fn sparse_columns(&self, table: &ParsedTable) -> Vec<String> {
        let threshold = table.row_count() as f64 * self.limits.missing_value_ratio;
        let mut seen = HashSet::new();

        table
            .columns
            .iter()
            .filter(|column| seen.insert(column.as_str()))
            .filter(|column| {
                let missing = table.column_values(column).filter(|v| v.is_absent()).count();
                missing as f64 > threshold
            })
            .cloned()
            .collect()
    }
}

/// Names that occur more than once, each reported once, in order of first repeat
fn duplicate_columns(columns: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();

    for column in columns {
        if !seen.insert(column.as_str()) && reported.insert(column.as_str()) {
            duplicates.push(column.clone());
        }
    }

    duplicates
}
