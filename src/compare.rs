// Percentage change between a current and a previous period.

use std::collections::{BTreeMap, HashMap};

use crate::types::{ComparisonRecord, MetricRecord, MetricValue};
use crate::util::round2;

/// Signed percentage change of `current` over `previous`, rounded to 2 decimals.
///
/// A zero or missing previous value reports `100` when the current value is
/// positive and `0` otherwise. Small previous values are not clamped.
pub fn percent_change(current: f64, previous: Option<f64>) -> f64 {
    match previous {
        Some(prev) if prev != 0.0 => {
            let pct = (current - prev) / prev * 100.0;
            if pct.is_finite() {
                round2(pct)
            } else {
                0.0
            }
        }
        _ => {
            if current > 0.0 {
                100.0
            } else {
                0.0
            }
        }
    }
}

/// Compare every numeric key of `current` against `previous`.
///
/// Keys whose current value is `NoData` are skipped; a `NoData` previous value
/// is treated as absent.
pub fn compare(current: &MetricRecord, previous: &MetricRecord) -> ComparisonRecord {
    current
        .iter()
        .filter_map(|(key, value)| {
            let cur = value.as_f64()?;
            let prev = previous.get(key).copied().and_then(MetricValue::as_f64);
            Some((key.clone(), percent_change(cur, prev)))
        })
        .collect()
}

/// Per-group comparison; groups missing from `previous` compare against nothing.
pub fn compare_groups(
    current: &HashMap<String, MetricRecord>,
    previous: &HashMap<String, MetricRecord>,
) -> BTreeMap<String, ComparisonRecord> {
    let empty = MetricRecord::new();
    current
        .iter()
        .map(|(name, record)| {
            let prev = previous.get(name).unwrap_or(&empty);
            (name.clone(), compare(record, prev))
        })
        .collect()
}
