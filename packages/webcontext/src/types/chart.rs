//! Chart specification types.
//!
//! A `ChartSpec` is the chart-library-agnostic description the pipeline
//! hands to callers for downstream visualization: a kind plus uniform
//! rows. Cells are tagged values so numeric coercion is explicit
//! instead of relying on string truthiness.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Kind of chart to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
}

/// A single cell: either a coerced number or the original text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Return the numeric value if this cell coerced to a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }

    /// Whether this cell holds a number.
    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Number(_))
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

/// One chart row; preserves column order and shares its key set with
/// every other row in the same spec.
pub type ChartRow = IndexMap<String, CellValue>;

/// A renderable chart: kind plus at least two rows, at least one
/// numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub rows: Vec<ChartRow>,
}

impl ChartSpec {
    /// Create a chart spec.
    pub fn new(kind: ChartKind, rows: Vec<ChartRow>) -> Self {
        Self { kind, rows }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
