// The parametrized engine: clean, filter, group, derive, compare.
//
// `run` is the single code path for every platform; a `PlatformConfig`
// supplies everything platform specific. `DatasetStore` keeps the latest
// result per platform id.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, info};

use crate::aggregate::aggregate;
use crate::compare::{compare, compare_groups};
use crate::error::Result;
use crate::loader::rows_from_table;
use crate::normalize::{apply_field_map, normalize};
use crate::period::{filter_by_range, previous_period, DateWindow};
use crate::platform::{PlatformConfig, PlatformRegistry};
use crate::types::{Cell, ComparisonRecord, MetricRecord, PlatformSummary, RawRow};

/// Everything derived from one platform's rows for one window.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformReport {
    pub platform: String,
    /// Rows that fell inside the current window.
    pub rows: usize,
    pub groups: HashMap<String, MetricRecord>,
    pub totals: MetricRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<DateWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_window: Option<DateWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_totals: Option<MetricRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonRecord>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub group_comparisons: BTreeMap<String, ComparisonRecord>,
}

struct Derived {
    rows: usize,
    groups: HashMap<String, MetricRecord>,
    totals: MetricRecord,
}

fn summarize(config: &PlatformConfig, rows: &[RawRow]) -> Derived {
    let keys = config.canonical_keys();
    let agg = aggregate(rows, &keys, &config.group_by);
    let calc = config.calculator();
    Derived {
        rows: rows.len(),
        groups: calc.derive_groups(&agg.groups),
        totals: calc.derive(&agg.totals),
    }
}

/// Run the whole engine for one platform.
///
/// Without a window, or for configs without a date column, every row is used
/// and no comparison is computed.
pub fn run(config: &PlatformConfig, rows: &[RawRow], window: Option<&DateWindow>) -> PlatformReport {
    let cleaned = apply_field_map(normalize(rows, &config.field_spec()), &config.base_metrics);
    let date_field = config.date_field.as_deref();
    let window = window.filter(|_| date_field.is_some());

    let current_rows = match (date_field, window) {
        (Some(field), Some(w)) => filter_by_range(&cleaned, field, Some(w)),
        _ => cleaned.clone(),
    };
    let current = summarize(config, &current_rows);
    debug!(
        platform = %config.id,
        rows = current.rows,
        groups = current.groups.len(),
        "aggregated current period"
    );

    let mut report = PlatformReport {
        platform: config.id.clone(),
        rows: current.rows,
        groups: current.groups,
        totals: current.totals,
        window: window.copied(),
        previous_window: None,
        previous_totals: None,
        comparison: None,
        group_comparisons: BTreeMap::new(),
    };

    if let (Some(field), Some(w), true) = (date_field, window, config.supports_comparison) {
        let prev_window = previous_period(w);
        let prev_rows = filter_by_range(&cleaned, field, Some(&prev_window));
        let previous = summarize(config, &prev_rows);
        debug!(
            platform = %config.id,
            rows = previous.rows,
            from = %prev_window.from,
            to = %prev_window.to,
            "aggregated previous period"
        );
        report.comparison = Some(compare(&report.totals, &previous.totals));
        report.group_comparisons = compare_groups(&report.groups, &previous.groups);
        report.previous_window = Some(prev_window);
        report.previous_totals = Some(previous.totals);
    }

    report
}

/// One platform's rows plus the latest engine output for them.
#[derive(Debug, Clone)]
pub struct PlatformDataset {
    pub raw_rows: Vec<RawRow>,
    pub report: PlatformReport,
}

impl PlatformDataset {
    pub fn groups(&self) -> &HashMap<String, MetricRecord> {
        &self.report.groups
    }

    pub fn totals(&self) -> &MetricRecord {
        &self.report.totals
    }

    pub fn comparison(&self) -> Option<&ComparisonRecord> {
        self.report.comparison.as_ref()
    }
}

/// Datasets keyed by platform id.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    registry: PlatformRegistry,
    window: Option<DateWindow>,
    datasets: BTreeMap<String, PlatformDataset>,
}

impl DatasetStore {
    pub fn new(registry: PlatformRegistry) -> Self {
        Self {
            registry,
            window: None,
            datasets: BTreeMap::new(),
        }
    }

    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }

    pub fn window(&self) -> Option<&DateWindow> {
        self.window.as_ref()
    }

    /// Replace the rows for `platform` and recompute its report.
    pub fn set_rows(&mut self, platform: &str, raw_rows: Vec<RawRow>) -> Result<&PlatformDataset> {
        let config = self.registry.get(platform)?;
        let report = run(config, &raw_rows, self.window.as_ref());
        info!(
            platform,
            rows = raw_rows.len(),
            groups = report.groups.len(),
            "dataset updated"
        );
        let dataset = PlatformDataset { raw_rows, report };
        let slot = match self.datasets.entry(platform.to_string()) {
            Entry::Occupied(mut e) => {
                e.insert(dataset);
                e.into_mut()
            }
            Entry::Vacant(e) => e.insert(dataset),
        };
        Ok(slot)
    }

    /// Convert an array-of-arrays table and store it for `platform`.
    pub fn ingest_table(&mut self, platform: &str, table: &[Vec<Cell>]) -> Result<&PlatformDataset> {
        self.registry.get(platform)?;
        let (rows, _) = rows_from_table(table);
        self.set_rows(platform, rows)
    }

    /// Change the reporting window and recompute every stored dataset.
    pub fn set_window(&mut self, window: Option<DateWindow>) {
        self.window = window;
        for (id, dataset) in self.datasets.iter_mut() {
            if let Ok(config) = self.registry.get(id) {
                dataset.report = run(config, &dataset.raw_rows, self.window.as_ref());
            }
        }
    }

    pub fn get(&self, platform: &str) -> Option<&PlatformDataset> {
        self.datasets.get(platform)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PlatformDataset)> {
        self.datasets.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn summaries(&self) -> Vec<PlatformSummary> {
        self.iter()
            .map(|(id, dataset)| {
                let name = self
                    .registry
                    .get(id)
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|_| id.to_string());
                let report = &dataset.report;
                PlatformSummary {
                    platform: id.to_string(),
                    name,
                    rows: report.rows,
                    groups: report.groups.len(),
                    window: report.window.map(|w| w.label()),
                    previous_window: report.previous_window.map(|w| w.label()),
                    totals: report.totals.clone(),
                    comparison: report.comparison.clone(),
                }
            })
            .collect()
    }
}
