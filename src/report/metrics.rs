use serde::{Deserialize, Serialize};

use crate::validate::ValidationResult;

/// Metadata keys containing this hold extracted cells (detection indicators).
pub const DETECTION_MARKER: &str = "/cells";
/// Metadata keys containing this hold a measured reconstruction error.
pub const ERROR_MARKER: &str = "_rmse";

/// How the aggregator treats a report column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Filled with 0 where missing and written as an integer.
    Indicator,
    /// Left absent where missing; absent is not the same as zero error.
    ErrorMagnitude,
    Other,
}

pub fn column_kind(name: &str) -> ColumnKind {
    if name.contains(ERROR_MARKER) {
        ColumnKind::ErrorMagnitude
    } else if name.contains(DETECTION_MARKER) {
        ColumnKind::Indicator
    } else {
        ColumnKind::Other
    }
}

/// One report cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ReportValue {
    /// Integer view used for indicator columns.
    pub fn to_int(&self) -> Option<i64> {
        match self {
            ReportValue::Int(i) => Some(*i),
            ReportValue::Float(f) if f.is_finite() => Some(*f as i64),
            ReportValue::Float(_) => None,
            ReportValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Converts a metadata value; objects and arrays become their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Option<ReportValue> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::Bool(b) => Some(ReportValue::Int(i64::from(*b))),
            serde_json::Value::Number(n) => Some(match n.as_i64() {
                Some(i) => ReportValue::Int(i),
                None => ReportValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            }),
            serde_json::Value::String(s) => Some(ReportValue::Text(s.clone())),
            other => Some(ReportValue::Text(other.to_string())),
        }
    }
}

impl std::fmt::Display for ReportValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportValue::Int(i) => write!(f, "{}", i),
            ReportValue::Float(v) => write!(f, "{}", v),
            ReportValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Everything measured for one evaluated image, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetrics {
    pub identity: String,
    pub kind: String,
    pub values: Vec<(String, ReportValue)>,
}

impl ImageMetrics {
    pub fn new(identity: impl Into<String>, kind: impl Into<String>) -> ImageMetrics {
        ImageMetrics { identity: identity.into(), kind: kind.into(), values: Vec::new() }
    }

    /// Records a detection under `name`: `name` = 1, `name_shapeokay`, `name_extra`.
    pub fn push_detection(&mut self, name: &str, result: &ValidationResult) {
        self.values.push((name.to_owned(), ReportValue::Int(1)));
        self.values.push((format!("{}_shapeokay", name), ReportValue::Int(i64::from(result.shape_okay))));
        self.values.push((format!("{}_extra", name), ReportValue::Int(result.extra_count)));
    }

    pub fn push_error(&mut self, name: &str, value: ReportValue) {
        self.values.push((name.to_owned(), value));
    }

    pub fn get(&self, name: &str) -> Option<&ReportValue> {
        self.values.iter().rev().find(|(k, _)| k == name).map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn column_kinds() {
        assert_eq!(column_kind("grid/cells"), ColumnKind::Indicator);
        assert_eq!(column_kind("grid/cells_extra"), ColumnKind::Indicator);
        assert_eq!(column_kind("grid/cells_rmse"), ColumnKind::ErrorMagnitude);
        assert_eq!(column_kind("warp_rmse"), ColumnKind::ErrorMagnitude);
        assert_eq!(column_kind("type"), ColumnKind::Other);
    }

    #[test]
    fn detection_adds_three_columns() {
        let mut m = ImageMetrics::new("a.png", "A");
        m.push_detection("grid/cells", &ValidationResult { shape_okay: false, extra_count: -2 });
        assert_eq!(m.get("grid/cells"), Some(&ReportValue::Int(1)));
        assert_eq!(m.get("grid/cells_shapeokay"), Some(&ReportValue::Int(0)));
        assert_eq!(m.get("grid/cells_extra"), Some(&ReportValue::Int(-2)));
    }

    #[test]
    fn json_values_convert() {
        assert_eq!(ReportValue::from_json(&json!(3)), Some(ReportValue::Int(3)));
        assert_eq!(ReportValue::from_json(&json!(0.25)), Some(ReportValue::Float(0.25)));
        assert_eq!(ReportValue::from_json(&json!(null)), None);
        assert_eq!(ReportValue::from_json(&json!([1])), Some(ReportValue::Text("[1]".into())));
    }

    #[test]
    fn int_view() {
        assert_eq!(ReportValue::Float(2.9).to_int(), Some(2));
        assert_eq!(ReportValue::Text(" 4 ".into()).to_int(), Some(4));
        assert_eq!(ReportValue::Float(f64::NAN).to_int(), None);
    }
}
