use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};

/// Separator between components in a shape descriptor (`2-3@1-4`).
pub const COMPONENT_SEPARATOR: char = '@';
/// Separator between rows and columns inside one component (`2-3`).
pub const DIMENSION_SEPARATOR: char = '-';

/// Dimensions of one grid component, in cells.
///
/// Serialised as a two-element array `[rows, cols]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(u64, u64)", into = "(u64, u64)")]
pub struct GridShape {
    pub rows: u64,
    pub cols: u64,
}

impl GridShape {
    pub fn new(rows: u64, cols: u64) -> GridShape {
        GridShape { rows, cols }
    }

    /// The same shape with its dimensions sorted ascending.
    ///
    /// Comparisons go through this form, so a 2x3 grid and a 3x2 grid are the
    /// same shape. That also hides a layout that is genuinely transposed.
    pub fn oriented(self) -> GridShape {
        GridShape {
            rows: self.rows.min(self.cols),
            cols: self.rows.max(self.cols),
        }
    }

    /// Parses one `rows-cols` component.
    pub fn parse(descriptor: &str) -> Result<GridShape> {
        let bad = || BenchError::invalid_input(format!("bad shape component {:?}", descriptor));
        let (rows, cols) = descriptor.trim().split_once(DIMENSION_SEPARATOR).ok_or_else(bad)?;
        let rows = rows.trim().parse::<u64>().map_err(|_| bad())?;
        let cols = cols.trim().parse::<u64>().map_err(|_| bad())?;
        Ok(GridShape { rows, cols })
    }

    /// Parses an `@`-joined list of components, e.g. `2-3@1-4`.
    pub fn parse_list(descriptor: &str) -> Result<Vec<GridShape>> {
        descriptor.split(COMPONENT_SEPARATOR).map(GridShape::parse).collect()
    }

    /// Inverse of [`GridShape::parse_list`].
    pub fn format_list(shapes: &[GridShape]) -> String {
        shapes
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(&COMPONENT_SEPARATOR.to_string())
    }
}

impl std::fmt::Display for GridShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.rows, DIMENSION_SEPARATOR, self.cols)
    }
}

impl From<(u64, u64)> for GridShape {
    fn from((rows, cols): (u64, u64)) -> Self {
        GridShape { rows, cols }
    }
}

impl From<GridShape> for (u64, u64) {
    fn from(shape: GridShape) -> Self {
        (shape.rows, shape.cols)
    }
}
