//! Numeric column statistics
//!
//! Every row is scanned. Booleans and text that does not read as a number
//! are ignored, and a column with no numeric values is left out entirely.

use std::collections::BTreeMap;

use crate::models::{ColumnStats, DatasetStats, ParsedTable};

/// Compute per-column statistics over every row of the table
pub fn calculate_stats(table: &ParsedTable) -> DatasetStats {
    let mut columns = BTreeMap::new();

    for column in &table.columns {
        if columns.contains_key(column) {
            continue;
        }
        let values: Vec<f64> = table
            .column_values(column)
            .filter_map(|value| value.as_number())
            .collect();
        if let Some(stats) = summarize(values) {
            columns.insert(column.clone(), stats);
        }
    }

    DatasetStats {
        row_count: table.row_count(),
        column_count: table.column_count(),
        columns,
    }
}

/// Summary of a set of finite values
///
/// Returns `None` when the set is empty or when the sum overflows to an
/// infinity, so the column is left out of the stats rather than reported with
/// a non-finite sum and average.
pub fn summarize(mut values: Vec<f64>) -> Option<ColumnStats> {
    if values.is_empty() {
        return None;
    }

    let sum: f64 = values.iter().sum();
    if !sum.is_finite() {
        log::debug!("Skipping column stats, sum of {} values overflowed", values.len());
        return None;
    }

    values.sort_by(f64::total_cmp);
    let count = values.len();
    let mid = count / 2;
    let median = if count % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    };

    Some(ColumnStats {
        count,
        min: values[0],
        max: values[count - 1],
        avg: sum / count as f64,
        sum,
        median,
    })
}
