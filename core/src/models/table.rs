//! Parsed table and raw document representation
//!
//! A [`RawDocument`] is the uploaded file exactly as received. The tabular
//! parser turns it into a [`ParsedTable`]: the header in file order plus the
//! typed rows.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use serde::{Serialize, Deserialize};

use super::row::{CellValue, Row};

/// Uploaded file as received, never mutated
#[derive(Clone)]
pub struct RawDocument {
    name: String,
    bytes: Vec<u8>,
}

impl Debug for RawDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RawDocument")
            .field("name", &self.name)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl RawDocument {
    /// Wrap uploaded bytes under their declared file name
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        RawDocument {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Declared file name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Header plus typed rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedTable {
    /// Column names exactly as they appear in the header, duplicates included
    pub columns: Vec<String>,

    /// Data rows in file order
    pub rows: Vec<Row>,
}

impl ParsedTable {
    /// Create a table from a header and rows
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        ParsedTable { columns, rows }
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of header columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Iterate the values of one column in row order
    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a CellValue> + 'a {
        self.rows.iter().map(move |row| row.get(column))
    }

    /// Copy of the table limited to the first `max_rows` rows
    pub fn truncated(&self, max_rows: usize) -> ParsedTable {
        ParsedTable {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(max_rows).cloned().collect(),
        }
    }
}
