//! End-to-end ingestion
//!
//! Raw bytes are fingerprinted once, parsed and validated. Only a valid
//! upload can be prepared for minting.

use std::time::Duration;

use chrono::{DateTime, Utc};
use log::info;

use crate::config::IngestLimits;
use crate::crypto::fingerprint;
use crate::error::{CoreError, Result};
use crate::metadata::{assess_tokenization, create_metadata_at, generate_preview, DatasetPreview, TokenizationReadiness};
use crate::models::{DatasetMetadata, DatasetStats, ParsedTable, RawDocument, ValidationResult};
use crate::schema::{calculate_stats, DatasetValidator};
use crate::tabular::TabularParser;
use crate::utils::Timer;

/// Stage duration above which a warning is logged
const SLOW_STAGE: Duration = Duration::from_millis(500);

/// Result of parsing and validating one upload
#[derive(Debug, Clone)]
pub struct Ingestion {
    /// Declared file name
    pub file_name: String,

    /// Validation verdict, including the fingerprint
    pub validation: ValidationResult,

    /// Parsed table, all rows
    pub table: ParsedTable,
}

impl Ingestion {
    /// Whether the upload may proceed to minting
    pub fn is_valid(&self) -> bool {
        self.validation.is_valid()
    }

    /// Display summary of the upload
    pub fn preview(&self) -> DatasetPreview {
        generate_preview(&self.file_name, &self.validation)
    }
}

/// Everything derived from a valid upload
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    /// Metadata to be compacted and minted
    pub metadata: DatasetMetadata,

    /// Numeric statistics over the capped rows
    pub stats: DatasetStats,

    /// Advisory readiness verdict
    pub readiness: TokenizationReadiness,
}

/// Parser, validator and limits wired together
#[derive(Debug, Clone, Default)]
pub struct IngestPipeline {
    parser: TabularParser,
    validator: DatasetValidator,
}

impl IngestPipeline {
    /// Create a pipeline with the given limits
    pub fn new(limits: IngestLimits) -> Self {
        IngestPipeline {
            parser: TabularParser::new(),
            validator: DatasetValidator::new(limits),
        }
    }

    /// Use a custom parser
    pub fn with_parser(mut self, parser: TabularParser) -> Self {
        self.parser = parser;
        self
    }

    /// Limits in force
    pub fn limits(&self) -> &IngestLimits {
        self.validator.limits()
    }

    /// Fingerprint, parse and validate an upload
    pub fn ingest(&self, document: &RawDocument) -> Ingestion {
        let timer = Timer::new(format!("ingest {}", document.name())).with_slow_threshold(SLOW_STAGE);

        let hash = fingerprint(document.bytes());
        let outcome = self.parser.parse(document.bytes());
        let validation = self.validator.validate(document, &outcome, hash);

        info!(
            "Ingested {} ({} bytes): valid={}, rows={}, columns={}, hash={}",
            document.name(),
            document.size(),
            validation.is_valid(),
            validation.row_count(),
            validation.column_count(),
            validation.hash().hex_prefix(16)
        );
        timer.finish("completed");

        Ingestion {
            file_name: document.name().to_string(),
            validation,
            table: outcome.table,
        }
    }

    /// Derive metadata, statistics and readiness, stamped with the current time
    pub fn prepare(&self, ingestion: &Ingestion) -> Result<PreparedDataset> {
        self.prepare_at(ingestion, Utc::now())
    }

    /// Derive metadata, statistics and readiness for a valid upload
    ///
    /// Statistics cover at most `max_rows` rows; the metadata still reports
    /// the full row count.
    pub fn prepare_at(&self, ingestion: &Ingestion, upload_date: DateTime<Utc>) -> Result<PreparedDataset> {
        if !ingestion.is_valid() {
            return Err(CoreError::InvalidDataset(ingestion.validation.errors().join("; ")));
        }
        let timer = Timer::new(format!("prepare {}", ingestion.file_name)).with_slow_threshold(SLOW_STAGE);

        let metadata = create_metadata_at(
            &ingestion.file_name,
            &ingestion.validation,
            &ingestion.table,
            upload_date,
        )?;

        let max_rows = self.limits().max_rows;
        let stats = if ingestion.table.row_count() > max_rows {
            calculate_stats(&ingestion.table.truncated(max_rows))
        } else {
            calculate_stats(&ingestion.table)
        };

        let readiness = assess_tokenization(&metadata)?;
        timer.finish("completed");

        Ok(PreparedDataset { metadata, stats, readiness })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{compact, decode_payload, CompactionLevel};
    use crate::models::ColumnType;

    const SALES: &[u8] = b"date,product,quantity,price\n2024-01-01,Widget A,10,29.99\n2024-01-02,Widget B,5,49.99\n2024-01-03,Widget C,8,79.99\n";

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_sales_file_end_to_end() {
        init_logging();
        let pipeline = IngestPipeline::default();
        let ingestion = pipeline.ingest(&RawDocument::new("sales.csv", SALES));

        assert!(ingestion.is_valid());
        assert_eq!(ingestion.validation.row_count(), 3);
        assert_eq!(ingestion.validation.column_count(), 4);

        let prepared = pipeline.prepare(&ingestion).unwrap();
        let schema = &prepared.metadata.schema;
        assert_eq!(schema["date"], ColumnType::Date);
        assert_eq!(schema["product"], ColumnType::String);
        assert_eq!(schema["quantity"], ColumnType::Number);
        assert_eq!(schema["price"], ColumnType::Number);

        let quantity = prepared.stats.columns["quantity"];
        assert_eq!((quantity.count, quantity.min, quantity.max), (3, 5.0, 10.0));
        assert_eq!((quantity.sum, quantity.median), (23.0, 8.0));
        assert_eq!(format!("{:.2}", quantity.avg), "7.67");

        let payload = compact(&prepared.metadata).unwrap();
        assert_eq!(payload.level(), CompactionLevel::Full);
        let decoded = decode_payload(payload.as_bytes()).unwrap();
        assert_eq!(decoded.hash_prefix, fingerprint(SALES).hex_prefix(12));
        assert_eq!((decoded.row_count, decoded.column_count), (Some(3), Some(4)));
    }

    #[test]
    fn test_empty_file_never_prepared() {
        let pipeline = IngestPipeline::default();
        let ingestion = pipeline.ingest(&RawDocument::new("empty.csv", Vec::new()));

        assert!(!ingestion.is_valid());
        let errors = ingestion.validation.errors();
        assert!(errors.iter().any(|e| e == "File is empty"));
        assert!(errors.iter().any(|e| e == "CSV file contains no data rows"));
        assert!(matches!(pipeline.prepare(&ingestion), Err(CoreError::InvalidDataset(_))));
    }

    #[test]
    fn test_stats_capped_at_max_rows() {
        init_logging();
        let limits = IngestLimits { max_rows: 2, ..IngestLimits::default() };
        let pipeline = IngestPipeline::new(limits);
        let ingestion = pipeline.ingest(&RawDocument::new("n.csv", &b"n\n1\n2\n3\n4\n"[..]));

        assert!(ingestion.is_valid());
        assert_eq!(ingestion.validation.warnings().len(), 1);

        let prepared = pipeline.prepare(&ingestion).unwrap();
        assert_eq!(prepared.metadata.row_count, 4);
        assert_eq!(prepared.stats.row_count, 2);
        assert_eq!(prepared.stats.columns["n"].sum, 3.0);
    }

    #[test]
    fn test_preview_from_ingestion() {
        let ingestion = IngestPipeline::default().ingest(&RawDocument::new("sales.csv", SALES));
        let preview = ingestion.preview();
        assert_eq!(preview.file_name, "sales.csv");
        assert_eq!(preview.sample_rows.len(), 3);
    }
}
