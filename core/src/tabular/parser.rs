//! CSV tokenizing and typing
//!
//! The parser never fails outright. Tokenizer problems are returned as
//! [`ParseOutcome::issues`] so the validator can report them alongside every
//! other problem with the upload.

use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, warn};

use crate::models::{ParsedTable, Row};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Parsed table plus any tokenizer problems met along the way
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    /// Everything that could be read
    pub table: ParsedTable,

    /// Human-readable tokenizer problems, already prefixed with `Parse error:`
    pub issues: Vec<String>,
}

/// CSV parser
#[derive(Debug, Clone)]
pub struct TabularParser {
    /// Field delimiter
    delimiter: u8,
}

impl Default for TabularParser {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl TabularParser {
    /// Create a parser for comma-separated input
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parse raw bytes, taking the first non-blank record as the header
    pub fn parse(&self, bytes: &[u8]) -> ParseOutcome {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .trim(Trim::None)
            .from_reader(bytes);

        let mut outcome = ParseOutcome::default();
        let mut header: Option<Vec<String>> = None;
        let mut record = StringRecord::new();

        loop {
            match reader.read_record(&mut record) {
                Ok(false) => break,
                Ok(true) => {}
                Err(err) => {
                    let line = err.position().map(|p| p.line()).unwrap_or(0);
                    warn!("CSV tokenizer stopped at line {}: {}", line, err);
                    outcome.issues.push(format!("Parse error: {}", err));
                    break;
                }
            }

            if is_blank_line(&record) {
                continue;
            }

            match &header {
                None => {
                    let columns: Vec<String> = record.iter().map(|f| f.trim().to_string()).collect();
                    if columns.iter().all(|c| c.is_empty()) {
                        outcome
                            .issues
                            .push("Parse error: header row has no column names".to_string());
                        header = Some(Vec::new());
                    } else {
                        header = Some(columns);
                    }
                }
                Some(columns) => {
                    if columns.is_empty() {
                        continue;
                    }
                    let fields: Vec<&str> = record.iter().collect();
                    outcome.table.rows.push(Row::from_fields(columns, &fields));
                }
            }
        }

        outcome.table.columns = header.unwrap_or_default();
        debug!(
            "Parsed {} rows across {} columns ({} issues)",
            outcome.table.row_count(),
            outcome.table.column_count(),
            outcome.issues.len()
        );
        outcome
    }
}

/// A line with no fields, or a single whitespace-only field
fn is_blank_line(record: &StringRecord) -> bool {
    record.len() <= 1 && record.iter().all(|field| field.trim().is_empty())
}

/// Parse raw bytes with the default comma-separated parser
pub fn parse(bytes: &[u8]) -> ParseOutcome {
    TabularParser::new().parse(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellValue;

    const SALES: &str = "date,product,quantity,price\n2024-01-01,Widget A,10,29.99\n2024-01-02,Widget B,5,49.99\n2024-01-03,Widget C,8,79.99\n";

    #[test]
    fn test_parse_typed_rows() {
        let outcome = parse(SALES.as_bytes());
        assert!(outcome.issues.is_empty());

        let table = outcome.table;
        assert_eq!(table.columns, vec!["date", "product", "quantity", "price"]);
        assert_eq!(table.row_count(), 3);

        let first = &table.rows[0];
        assert_eq!(first.get("date"), &CellValue::Text("2024-01-01".to_string()));
        assert_eq!(first.get("product"), &CellValue::Text("Widget A".to_string()));
        assert_eq!(first.get("quantity"), &CellValue::Number(10.0));
        assert_eq!(first.get("price"), &CellValue::Number(29.99));
    }

    #[test]
    fn test_empty_input() {
        let outcome = parse(b"");
        assert!(outcome.issues.is_empty());
        assert!(outcome.table.columns.is_empty());
        assert!(outcome.table.rows.is_empty());
    }

    #[test]
    fn test_header_only() {
        let outcome = parse(b"a,b,c\n");
        assert_eq!(outcome.table.column_count(), 3);
        assert_eq!(outcome.table.row_count(), 0);
    }

    #[test]
    fn test_blank_lines_skipped_but_comma_rows_kept() {
        let outcome = parse(b"a,b\n\n1,2\n   \n,\n3,4\n");
        let table = outcome.table;

        assert_eq!(table.row_count(), 3);
        assert!(table.rows[1].is_blank());
        assert_eq!(table.rows[2].get("a"), &CellValue::Number(3.0));
    }

    #[test]
    fn test_ragged_rows_are_normalized() {
        let outcome = parse(b"a,b,c\n1\n1,2,3,4,5\n");
        assert!(outcome.issues.is_empty());

        let table = outcome.table;
        assert!(table.rows[0].get("c").is_absent());
        assert_eq!(table.rows[1].cell_count(), 3);
        for row in &table.rows {
            assert!(row.keys().all(|k| table.columns.iter().any(|c| c == k)));
        }
    }

    #[test]
    fn test_bom_and_header_whitespace_stripped() {
        let outcome = parse(b"\xEF\xBB\xBF id , name\n1,x\n");
        assert_eq!(outcome.table.columns, vec!["id", "name"]);
        assert_eq!(outcome.table.rows[0].get("id"), &CellValue::Number(1.0));
    }

    #[test]
    fn test_quoted_fields() {
        let outcome = parse(b"name,note\n\"Smith, J\",\"said \"\"hi\"\"\"\n");
        let row = &outcome.table.rows[0];
        assert_eq!(row.get("name"), &CellValue::Text("Smith, J".to_string()));
        assert_eq!(row.get("note"), &CellValue::Text("said \"hi\"".to_string()));
    }

    #[test]
    fn test_duplicate_header_preserved() {
        let outcome = parse(b"a,a,b\n1,2,3\n");
        assert_eq!(outcome.table.columns, vec!["a", "a", "b"]);
        assert_eq!(outcome.table.rows[0].get("a"), &CellValue::Number(2.0));
    }

    #[test]
    fn test_invalid_utf8_reported_as_issue() {
        let outcome = parse(b"a,b\n1,2\n\xFF\xFE,3\n");
        assert_eq!(outcome.issues.len(), 1);
        assert!(outcome.issues[0].starts_with("Parse error:"));
        assert_eq!(outcome.table.row_count(), 1);
    }

    #[test]
    fn test_header_without_names() {
        let outcome = parse(b",,\n1,2,3\n");
        assert_eq!(outcome.issues, vec!["Parse error: header row has no column names"]);
        assert!(outcome.table.columns.is_empty());
        assert!(outcome.table.rows.is_empty());
    }

    #[test]
    fn test_custom_delimiter() {
        let outcome = TabularParser::new().with_delimiter(b';').parse(b"a;b\n1;true\n");
        assert_eq!(outcome.table.rows[0].get("b"), &CellValue::Boolean(true));
    }
}
