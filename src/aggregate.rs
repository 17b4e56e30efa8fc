use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::types::{Cell, MetricRecord, MetricValue, RawRow, UNKNOWN_GROUP};

/// Per-group base metric sums plus the grand total.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Aggregation {
    pub groups: HashMap<String, MetricRecord>,
    pub totals: MetricRecord,
}

impl Aggregation {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups ordered by `metric`, see [`sort_groups`].
    pub fn sorted_groups(&self, metric: &str, descending: bool) -> Vec<(&str, &MetricRecord)> {
        sort_groups(&self.groups, metric, descending)
    }

    /// The `n` largest groups by `metric`.
    pub fn top_n(&self, metric: &str, n: usize) -> Vec<(&str, &MetricRecord)> {
        let mut rows = self.sorted_groups(metric, true);
        rows.truncate(n);
        rows
    }
}

/// Groups ordered by `metric` (missing or `NoData` sorts as 0), ties broken by name.
pub fn sort_groups<'a>(
    groups: &'a HashMap<String, MetricRecord>,
    metric: &str,
    descending: bool,
) -> Vec<(&'a str, &'a MetricRecord)> {
    let value = |r: &MetricRecord| r.get(metric).and_then(|v| v.as_f64()).unwrap_or(0.0);
    let mut rows: Vec<(&str, &MetricRecord)> = groups
        .iter()
        .map(|(name, record)| (name.as_str(), record))
        .collect();
    rows.sort_by(|a, b| {
        let ord = value(a.1).partial_cmp(&value(b.1)).unwrap_or(Ordering::Equal);
        let ord = if descending { ord.reverse() } else { ord };
        ord.then_with(|| a.0.cmp(b.0))
    });
    rows
}

/// Group key for a row: the trimmed group-by value, or `"Unknown"`.
pub fn group_key(row: &RawRow, group_by: &str) -> String {
    match row.get(group_by) {
        Some(cell) if !cell.is_blank() => cell.as_string().trim().to_string(),
        _ => UNKNOWN_GROUP.to_string(),
    }
}

/// Sum `base_metrics` per value of `group_by`.
///
/// Totals are accumulated from the per-group sums, not from the rows, so the
/// totals always equal the sum of the groups. An empty row set yields no
/// groups and totals where every metric is [`MetricValue::NoData`].
pub fn aggregate<S: AsRef<str>>(rows: &[RawRow], base_metrics: &[S], group_by: &str) -> Aggregation {
    if rows.is_empty() {
        let totals = base_metrics
            .iter()
            .map(|k| (k.as_ref().to_string(), MetricValue::NoData))
            .collect();
        return Aggregation {
            groups: HashMap::new(),
            totals,
        };
    }

    let mut sums: HashMap<String, Vec<f64>> = HashMap::new();
    for row in rows {
        let e = sums
            .entry(group_key(row, group_by))
            .or_insert_with(|| vec![0.0; base_metrics.len()]);
        for (slot, key) in e.iter_mut().zip(base_metrics) {
            *slot += row.get(key.as_ref()).map(Cell::as_f64).unwrap_or(0.0);
        }
    }

    let mut grand = vec![0.0; base_metrics.len()];
    let groups: HashMap<String, MetricRecord> = sums
        .into_iter()
        .map(|(name, values)| {
            for (g, v) in grand.iter_mut().zip(&values) {
                *g += v;
            }
            let record = base_metrics
                .iter()
                .zip(values)
                .map(|(k, v)| (k.as_ref().to_string(), MetricValue::Value(v)))
                .collect();
            (name, record)
        })
        .collect();

    let totals = base_metrics
        .iter()
        .zip(grand)
        .map(|(k, v)| (k.as_ref().to_string(), MetricValue::Value(v)))
        .collect();

    Aggregation { groups, totals }
}
