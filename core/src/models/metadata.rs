//! Dataset metadata and statistics
//!
//! [`DatasetMetadata`] is the logical artifact anchored on the ledger. It is
//! built once after a successful validation and never mutated afterwards.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

use crate::crypto::ContentHash;

/// Inferred column type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Free text
    String,

    /// Numeric literal
    Number,

    /// `true`/`false` literal
    Boolean,

    /// Calendar date
    Date,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ColumnType::String => "string",
            ColumnType::Number => "number",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
        };
        f.write_str(tag)
    }
}

/// Column name to inferred type
pub type ColumnSchema = BTreeMap<String, ColumnType>;

/// Row quality summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    /// Rows considered
    pub total_rows: usize,

    /// Rows with at least one value
    pub valid_rows: usize,

    /// Rows with no values at all
    pub invalid_rows: usize,
}

/// Metadata describing one validated dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMetadata {
    /// Declared file name
    pub file_name: String,

    /// Upload time (ISO-8601, UTC)
    pub upload_date: DateTime<Utc>,

    /// Fingerprint of the raw upload
    pub hash: ContentHash,

    /// Row count reported by validation
    pub row_count: usize,

    /// Header column names
    pub columns: Vec<String>,

    /// Inferred column types
    pub schema: ColumnSchema,

    /// Row quality summary
    pub summary: DatasetSummary,
}

impl DatasetMetadata {
    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Summary statistics for one numeric column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    /// Number of numeric values
    pub count: usize,

    /// Smallest value
    pub min: f64,

    /// Largest value
    pub max: f64,

    /// Arithmetic mean
    pub avg: f64,

    /// Sum of values
    pub sum: f64,

    /// Median of the sorted values
    pub median: f64,
}

/// Statistics over a whole table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStats {
    /// Rows scanned
    pub row_count: usize,

    /// Header columns
    pub column_count: usize,

    /// Per-column statistics; columns without numeric values are omitted
    pub columns: BTreeMap<String, ColumnStats>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::fingerprint;
    use chrono::TimeZone;

    #[test]
    fn test_metadata_wire_format() {
        let mut schema = ColumnSchema::new();
        schema.insert("price".to_string(), ColumnType::Number);
        schema.insert("date".to_string(), ColumnType::Date);

        let metadata = DatasetMetadata {
            file_name: "sales.csv".to_string(),
            upload_date: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            hash: fingerprint(b"sales"),
            row_count: 3,
            columns: vec!["date".to_string(), "price".to_string()],
            schema,
            summary: DatasetSummary { total_rows: 3, valid_rows: 3, invalid_rows: 0 },
        };

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["fileName"], "sales.csv");
        assert_eq!(json["uploadDate"], "2024-01-02T03:04:05Z");
        assert_eq!(json["schema"]["price"], "number");
        assert_eq!(json["schema"]["date"], "date");
        assert_eq!(json["summary"]["validRows"], 3);
        assert_eq!(metadata.column_count(), 2);

        let back: DatasetMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(back, metadata);
    }

    #[test]
    fn test_accepts_millisecond_upload_date() {
        let json = serde_json::json!({
            "fileName": "a.csv",
            "uploadDate": "2024-05-01T10:00:00.123Z",
            "hash": fingerprint(b"a").to_hex(),
            "rowCount": 1,
            "columns": ["a"],
            "schema": {"a": "string"},
            "summary": {"totalRows": 1, "validRows": 1, "invalidRows": 0}
        });
        let metadata: DatasetMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(metadata.schema["a"], ColumnType::String);
    }
}
