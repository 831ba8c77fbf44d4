use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::report::metrics::{column_kind, ColumnKind, ImageMetrics, ReportValue};
use crate::table::write_table;

pub const IDENTITY_COLUMN: &str = "fn";
pub const TYPE_COLUMN: &str = "type";

/// Flat table, one row per evaluated image.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkReport {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<ReportValue>>>,
}

impl BenchmarkReport {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&ReportValue> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col)?.as_ref()
    }

    /// Writes the report; absent values become empty fields.
    pub fn write(&self, path: &Path) -> Result<()> {
        let rows = self.rows.iter().map(|row| {
            row.iter()
                .map(|v| v.as_ref().map(|v| v.to_string()).unwrap_or_default())
                .collect()
        });
        write_table(path, &self.columns, rows)?;
        log::info!("wrote {} report rows to {}", self.rows.len(), path.display());
        Ok(())
    }
}

/// Folds per-image metrics into a report.
///
/// Columns are `fn`, `type`, then every metric in order of first appearance,
/// one row per input in input order.
///
/// Missing values are filled per column kind:
/// - indicator columns (derived from `/cells` keys) get 0 and are coerced to
///   integers, so an image the extractor never touched scores as a miss
/// - error-magnitude columns (`_rmse` keys) keep their gaps
/// - any other column keeps its gaps
pub fn aggregate(results: &[ImageMetrics]) -> BenchmarkReport {
    let mut columns = vec![IDENTITY_COLUMN.to_owned(), TYPE_COLUMN.to_owned()];
    let mut index: HashMap<String, usize> = columns.iter().cloned().enumerate().map(|(i, c)| (c, i)).collect();
    for metrics in results {
        for (name, _) in &metrics.values {
            if !index.contains_key(name) {
                index.insert(name.clone(), columns.len());
                columns.push(name.clone());
            }
        }
    }

    let mut rows: Vec<Vec<Option<ReportValue>>> = results
        .iter()
        .map(|metrics| {
            let mut row = vec![None; columns.len()];
            row[0] = Some(ReportValue::Text(metrics.identity.clone()));
            row[1] = Some(ReportValue::Text(metrics.kind.clone()));
            for (name, value) in &metrics.values {
                if let Some(&i) = index.get(name) {
                    row[i] = Some(value.clone());
                }
            }
            row
        })
        .collect();

    for (i, name) in columns.iter().enumerate() {
        if column_kind(name) != ColumnKind::Indicator {
            continue;
        }
        for row in &mut rows {
            let filled = row[i].as_ref().and_then(|v| v.to_int()).unwrap_or(0);
            row[i] = Some(ReportValue::Int(filled));
        }
    }

    BenchmarkReport { columns, rows }
}
