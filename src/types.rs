use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

use crate::util::parse_f64_or_zero;

/// Literal rendered in place of a metric when a dataset has no rows.
pub const NO_DATA: &str = "No Data";

/// Bucket name for rows whose group-by column is missing or blank.
pub const UNKNOWN_GROUP: &str = "Unknown";

/// A single spreadsheet cell as delivered by the upstream API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// True for empty cells and whitespace-only strings.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Number(_) => false,
            Cell::Text(s) => s.trim().is_empty(),
        }
    }

    /// Numeric view of the cell; text goes through the lenient parser.
    pub fn as_f64(&self) -> f64 {
        match self {
            Cell::Empty => 0.0,
            Cell::Number(n) if n.is_finite() => *n,
            Cell::Number(_) => 0.0,
            Cell::Text(s) => parse_f64_or_zero(s),
        }
    }

    /// String view of the cell, stringifying numbers.
    pub fn as_string(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// One row keyed by column name. Column names differ per platform.
pub type RawRow = BTreeMap<String, Cell>;

/// An aggregated metric, or the explicit marker for "this dataset was empty".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Value(f64),
    NoData,
}

impl MetricValue {
    pub fn as_f64(self) -> Option<f64> {
        match self {
            MetricValue::Value(v) => Some(v),
            MetricValue::NoData => None,
        }
    }

    pub fn is_no_data(self) -> bool {
        matches!(self, MetricValue::NoData)
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Value(v)
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetricValue::Value(v) => serializer.serialize_f64(*v),
            MetricValue::NoData => serializer.serialize_str(NO_DATA),
        }
    }
}

/// Metric key -> value for a single group or for the totals.
pub type MetricRecord = BTreeMap<String, MetricValue>;

/// Metric key -> signed percentage change, rounded to 2 decimals.
pub type ComparisonRecord = BTreeMap<String, f64>;

#[derive(Debug, Clone, Serialize)]
pub struct WindowLabel {
    pub from: String,
    pub to: String,
}

/// Per-platform entry of `summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformSummary {
    pub platform: String,
    pub name: String,
    pub rows: usize,
    pub groups: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_window: Option<WindowLabel>,
    pub totals: MetricRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonRecord>,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub generated_at: String,
    pub platforms: Vec<PlatformSummary>,
}
