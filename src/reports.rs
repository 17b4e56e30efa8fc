use crate::aggregate::sort_groups;
use crate::format::{format_change, format_metric};
use crate::pipeline::{DatasetStore, PlatformReport};
use crate::platform::PlatformConfig;
use crate::types::{MetricRecord, MetricValue, SummaryStats};
use chrono::Local;

/// A rendered table: header plus rows of display strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Render `record[key]`. A column the record lacks reads as `0`, or as
/// "No Data" when the record was built from no rows.
fn cell(record: &MetricRecord, key: &str, empty: bool) -> String {
    let fallback = if empty {
        MetricValue::NoData
    } else {
        MetricValue::Value(0.0)
    };
    format_metric(key, &record.get(key).copied().unwrap_or(fallback))
}

/// One row per group in display column order, largest first by the first
/// display column, followed by a `Total` row.
pub fn generate_group_table(config: &PlatformConfig, report: &PlatformReport) -> ReportTable {
    let columns = config.display_order();
    let mut header = Vec::with_capacity(columns.len() + 1);
    header.push(config.group_by.clone());
    header.extend(columns.iter().cloned());

    let sort_key = columns.first().map(String::as_str).unwrap_or_default();
    let empty = report.rows == 0;
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(report.groups.len() + 1);
    for (name, record) in sort_groups(&report.groups, sort_key, true) {
        let mut row = Vec::with_capacity(header.len());
        row.push(name.to_string());
        row.extend(columns.iter().map(|k| cell(record, k, empty)));
        rows.push(row);
    }

    let mut total = Vec::with_capacity(header.len());
    total.push("Total".to_string());
    total.extend(columns.iter().map(|k| cell(&report.totals, k, empty)));
    rows.push(total);

    ReportTable { header, rows }
}

/// Current vs previous totals with the signed change, one row per display column.
///
/// Empty when the report has no comparison.
pub fn generate_comparison_table(config: &PlatformConfig, report: &PlatformReport) -> ReportTable {
    let (Some(comparison), Some(previous)) = (&report.comparison, &report.previous_totals) else {
        return ReportTable::default();
    };
    let current_empty = report.rows == 0;
    let previous_empty = previous.values().all(|v| v.is_no_data());
    let header = ["Metric", "Current", "Previous", "Change"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rows = config
        .display_order()
        .into_iter()
        .filter_map(|key| {
            let change = comparison.get(&key)?;
            Some(vec![
                key.clone(),
                cell(&report.totals, &key, current_empty),
                cell(previous, &key, previous_empty),
                format_change(*change),
            ])
        })
        .collect();
    ReportTable { header, rows }
}

pub fn generate_summary(store: &DatasetStore) -> SummaryStats {
    SummaryStats {
        generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        platforms: store.summaries(),
    }
}
