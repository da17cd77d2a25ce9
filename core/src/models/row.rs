//! Parsed CSV row representation
//!
//! This module provides the dynamically-typed cell value and the row type
//! produced by the tabular parser.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use serde::{Serialize, Deserialize};
use serde::ser::SerializeMap;

/// Type of a parsed cell value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    /// Text string
    Text,

    /// Finite number
    Number,

    /// Boolean
    Boolean,

    /// Empty cell
    Absent,
}

/// Value in a parsed row
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Finite number
    Number(f64),

    /// Boolean
    Boolean(bool),

    /// Text string
    Text(String),

    /// Empty cell
    Absent,
}

impl Debug for CellValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CellValue::Number(v) => write!(f, "Number({})", v),
            CellValue::Boolean(v) => write!(f, "Boolean({})", v),
            CellValue::Text(v) => {
                if v.chars().count() > 20 {
                    let head: String = v.chars().take(20).collect();
                    write!(f, "Text(\"{}...\")", head)
                } else {
                    write!(f, "Text(\"{}\")", v)
                }
            }
            CellValue::Absent => write!(f, "Absent"),
        }
    }
}

impl CellValue {
    /// Coerce a raw CSV field the way a dynamic-typing CSV reader does
    ///
    /// Numeric-looking fields become numbers, `true`/`false` (any case)
    /// become booleans, empty fields become [`CellValue::Absent`] and
    /// everything else is kept verbatim as text.
    pub fn coerce(raw: &str) -> Self {
        if raw.is_empty() {
            return CellValue::Absent;
        }
        if let Some(number) = parse_numeric_literal(raw) {
            return CellValue::Number(number);
        }
        if let Some(flag) = parse_boolean_literal(raw) {
            return CellValue::Boolean(flag);
        }
        CellValue::Text(raw.to_string())
    }

    /// Get the type of the value
    pub fn value_type(&self) -> ValueType {
        match self {
            CellValue::Number(_) => ValueType::Number,
            CellValue::Boolean(_) => ValueType::Boolean,
            CellValue::Text(_) => ValueType::Text,
            CellValue::Absent => ValueType::Absent,
        }
    }

    /// Whether the cell is empty
    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Absent)
    }

    /// Numeric view of the value, if it has one
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) if v.is_finite() => Some(*v),
            CellValue::Text(s) => parse_numeric_literal(s),
            _ => None,
        }
    }
}

/// Parse a numeric literal, rejecting `inf`, `NaN` and other non-decimal spellings
pub fn parse_numeric_literal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    if !trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a case-insensitive `true`/`false` literal
pub fn parse_boolean_literal(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// A parsed data row keyed by column name
///
/// Keys are unique and always a subset of the table's header. When the
/// header repeats a name, the last field carrying it wins.
#[derive(Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, CellValue)>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from a header and the raw fields of one record
    ///
    /// Missing trailing fields become [`CellValue::Absent`]; fields beyond the
    /// header are dropped.
    pub fn from_fields<S: AsRef<str>>(columns: &[String], fields: &[S]) -> Self {
        let mut row = Row::new();
        for (index, column) in columns.iter().enumerate() {
            let value = fields
                .get(index)
                .map(|field| CellValue::coerce(field.as_ref()))
                .unwrap_or(CellValue::Absent);
            row.insert(column.clone(), value);
        }
        row
    }

    /// Set a value, replacing any existing value for the column
    pub fn insert(&mut self, column: String, value: CellValue) {
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((column, value)),
        }
    }

    /// Get the value for a column; unknown columns read as absent
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
            .unwrap_or(&CellValue::Absent)
    }

    /// Column names present in this row, in header order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    /// Values in header order
    pub fn values(&self) -> impl Iterator<Item = &CellValue> {
        self.cells.iter().map(|(_, value)| value)
    }

    /// Whether every cell is absent
    pub fn is_blank(&self) -> bool {
        self.values().all(CellValue::is_absent)
    }

    /// Whether at least one cell carries a value
    pub fn has_any_value(&self) -> bool {
        !self.is_blank()
    }

    /// Number of keyed cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

impl Debug for Row {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_map()
            .entries(self.cells.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

impl Serialize for Row {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, value) in &self.cells {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> serde::de::Visitor<'de> for RowVisitor {
            type Value = Row;

            fn expecting(&self, f: &mut Formatter<'_>) -> FmtResult {
                f.write_str("a map of column names to cell values")
            }

            fn visit_map<A: serde::de::MapAccess<'de>>(self, mut access: A) -> Result<Row, A::Error> {
                let mut row = Row::new();
                while let Some((name, value)) = access.next_entry::<String, CellValue>()? {
                    row.insert(name, value);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}
