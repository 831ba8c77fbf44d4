//! Delimited-table parsing shared by the rule table, the sample manifest and
//! the benchmark report.
//!
//! Supported format:
//! - UTF-8, comma-separated
//! - Mandatory header row; columns are looked up by name
//! - Double-quoted fields with embedded commas and doubled quotes
//! - Blank lines are skipped

use crate::error::{BenchError, Result};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Index of the header column called `name`.
    pub fn column(&self, name: &str) -> Result<usize> {
        self.header
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| BenchError::invalid_input(format!("table has no `{}` column", name)))
    }

    /// Cell `col` of `row`, or an error naming the 1-based data row.
    pub fn cell<'a>(&self, row: &'a [String], row_idx: usize, col: usize) -> Result<&'a str> {
        row.get(col).map(|c| c.as_str()).ok_or_else(|| {
            BenchError::invalid_input(format!(
                "Row {}: expected at least {} columns, got {}",
                row_idx + 1,
                col + 1,
                row.len()
            ))
        })
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parses table bytes into a header plus data rows.
pub fn parse_table(data: &[u8]) -> Result<Table> {
    let text = std::str::from_utf8(data)
        .map_err(|_| BenchError::invalid_input("table is not valid UTF-8"))?;

    let mut lines = text.lines().map(|l| l.trim_end_matches('\r')).filter(|l| !l.trim().is_empty());

    let header = match lines.next() {
        Some(first) => parse_row(first),
        None => return Err(BenchError::invalid_input("table is empty")),
    };
    let rows = lines.map(parse_row).collect();

    Ok(Table { header, rows })
}

/// Formats one row, quoting fields that need it.
pub fn format_row<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| quote_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Parses a single row, handling double-quoted fields.
fn parse_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    // Escaped quote inside quoted field.
                    current.push('"');
                    chars.next();
                    continue;
                }
                in_quotes = !in_quotes;
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}
