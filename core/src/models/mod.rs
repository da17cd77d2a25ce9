//! Data models for dataset ingestion and minting
//!
//! Each model is produced by exactly one pipeline stage and handed to the
//! next by value or shared reference; none is mutated after it is built.

mod table;
mod row;
mod validation;
mod metadata;
mod mint;

pub use table::{RawDocument, ParsedTable};
pub use row::{Row, ValueType, CellValue, parse_numeric_literal, parse_boolean_literal};
pub use validation::ValidationResult;
pub use metadata::{
    ColumnType, ColumnSchema, ColumnStats, DatasetMetadata, DatasetStats, DatasetSummary,
};
pub use mint::{MintResult, GalleryRecord};
