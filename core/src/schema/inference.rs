//! Column type inference
//!
//! Types come from the first data row only. A blank first cell types the
//! column as `string` even when later rows hold numbers.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::{CellValue, ColumnSchema, ColumnType, ParsedTable};

/// Calendar date layouts accepted for `date` columns
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y", "%d/%m/%Y", "%Y-%m", "%Y/%m"];

/// Date-time layouts accepted for `date` columns
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Infer one type per column from the first data row
///
/// Tables without rows get an empty schema. Duplicate header names collapse
/// to a single entry.
pub fn infer_schema(table: &ParsedTable) -> ColumnSchema {
    let mut schema = ColumnSchema::new();
    let Some(first) = table.rows.first() else {
        return schema;
    };

    for column in &table.columns {
        schema.insert(column.clone(), infer_value_type(first.get(column)));
    }
    schema
}

/// Type of a single cell: numeric, then boolean, then date, else string
pub fn infer_value_type(value: &CellValue) -> ColumnType {
    match value {
        CellValue::Number(_) => ColumnType::Number,
        CellValue::Boolean(_) => ColumnType::Boolean,
        CellValue::Text(text) if is_date_literal(text) => ColumnType::Date,
        CellValue::Text(_) | CellValue::Absent => ColumnType::String,
    }
}

/// A string containing `-` or `/` that parses as a calendar date or date-time
pub fn is_date_literal(raw: &str) -> bool {
    let trimmed = raw.trim();
    if !trimmed.contains('-') && !trimmed.contains('/') {
        return false;
    }

    if DateTime::parse_from_rfc3339(trimmed).is_ok() {
        return true;
    }
    if DATE_FORMATS
        .iter()
        .any(|format| parse_partial_date(trimmed, format).is_some())
    {
        return true;
    }
    DATETIME_FORMATS
        .iter()
        .any(|format| NaiveDateTime::parse_from_str(trimmed, format).is_ok())
}

/// Parse a date layout, allowing year-month layouts without a day
fn parse_partial_date(raw: &str, format: &str) -> Option<NaiveDate> {
    if format.contains("%d") {
        NaiveDate::parse_from_str(raw, format).ok()
    } else {
        NaiveDate::parse_from_str(&format!("{}-01", raw), &format!("{}-%d", format)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabular::parse;
    use rstest::rstest;

    #[rstest]
    #[case("2024-01-01", true)]
    #[case("2024/01/31", true)]
    #[case("01/31/2024", true)]
    #[case("2024-01-01T10:00:00Z", true)]
    #[case("2024-01-01 10:00:00", true)]
    #[case("2024-05", true)]
    #[case("2024-13-01", false)]
    #[case("20240101", false)]
    #[case("a-b", false)]
    #[case("Widget A", false)]
    #[case("n/a", false)]
    fn test_date_literal(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(is_date_literal(raw), expected);
    }

    #[test]
    fn test_infer_sales_schema() {
        let outcome = parse(b"date,product,quantity,price\n2024-01-01,Widget A,10,29.99\n2024-01-02,Widget B,5,49.99\n");
        let schema = infer_schema(&outcome.table);

        assert_eq!(schema.len(), 4);
        assert_eq!(schema["date"], ColumnType::Date);
        assert_eq!(schema["product"], ColumnType::String);
        assert_eq!(schema["quantity"], ColumnType::Number);
        assert_eq!(schema["price"], ColumnType::Number);
    }

    #[test]
    fn test_boolean_any_case() {
        let outcome = parse(b"flag,other\nTRUE,False\n");
        let schema = infer_schema(&outcome.table);
        assert_eq!(schema["flag"], ColumnType::Boolean);
        assert_eq!(schema["other"], ColumnType::Boolean);
    }

    #[test]
    fn test_blank_first_cell_is_string() {
        let outcome = parse(b"a,b\n,1\n5,2\n6,3\n");
        let schema = infer_schema(&outcome.table);
        assert_eq!(schema["a"], ColumnType::String);
        assert_eq!(schema["b"], ColumnType::Number);
    }

    #[test]
    fn test_only_first_row_is_used() {
        let outcome = parse(b"a\nhello\n1\n2\n");
        assert_eq!(infer_schema(&outcome.table)["a"], ColumnType::String);
    }

    #[test]
    fn test_no_rows_gives_empty_schema() {
        let outcome = parse(b"a,b\n");
        assert!(infer_schema(&outcome.table).is_empty());
    }

    #[test]
    fn test_every_column_gets_one_type() {
        let outcome = parse(b"x,y,z,w\n1,true,2024-02-02,text\n");
        let schema = infer_schema(&outcome.table);
        for column in &outcome.table.columns {
            assert!(schema.contains_key(column));
        }
    }
}
