// Ratio metrics computed from summed base metrics.
//
// Every formula divides with `safe_div`, so a zero denominator yields `0`
// rather than NaN or infinity. Percentages are kept scaled by 100 and are
// not rounded here; rounding happens when values are rendered.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{MetricRecord, MetricValue};
use crate::util::safe_div;

/// Canonical base metric keys the formulas read from.
pub mod keys {
    pub const IMPRESSIONS: &str = "impressions";
    pub const CLICKS: &str = "clicks";
    pub const CONVERSIONS: &str = "conversions";
    pub const SPENT: &str = "spent";
    pub const REACH: &str = "reach";
    pub const VIDEO_VIEWS: &str = "videoViews";
    pub const ENGAGEMENTS: &str = "engagements";
    pub const CONVERSION_VALUE: &str = "conversionValue";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DerivedMetric {
    Frequency,
    Cpr,
    Ctr,
    Cpc,
    #[serde(alias = "cvr")]
    ConRate,
    Cpl,
    Cpm,
    Cpv,
    Cpe,
    Cpa,
    Roas,
    EngagementRate,
    ViewRate,
}

impl DerivedMetric {
    pub const ALL: [DerivedMetric; 13] = [
        DerivedMetric::Frequency,
        DerivedMetric::Cpr,
        DerivedMetric::Ctr,
        DerivedMetric::Cpc,
        DerivedMetric::ConRate,
        DerivedMetric::Cpl,
        DerivedMetric::Cpm,
        DerivedMetric::Cpv,
        DerivedMetric::Cpe,
        DerivedMetric::Cpa,
        DerivedMetric::Roas,
        DerivedMetric::EngagementRate,
        DerivedMetric::ViewRate,
    ];

    /// Key under which the value is stored in a [`MetricRecord`].
    pub fn key(self) -> &'static str {
        match self {
            DerivedMetric::Frequency => "frequency",
            DerivedMetric::Cpr => "cpr",
            DerivedMetric::Ctr => "ctr",
            DerivedMetric::Cpc => "cpc",
            DerivedMetric::ConRate => "conRate",
            DerivedMetric::Cpl => "cpl",
            DerivedMetric::Cpm => "cpm",
            DerivedMetric::Cpv => "cpv",
            DerivedMetric::Cpe => "cpe",
            DerivedMetric::Cpa => "cpa",
            DerivedMetric::Roas => "roas",
            DerivedMetric::EngagementRate => "engagementRate",
            DerivedMetric::ViewRate => "viewRate",
        }
    }

    /// `(numerator, denominator, scale)` for this metric.
    ///
    /// `action_key` is the platform's chosen denominator for `cpa`.
    fn operands<'a>(self, action_key: &'a str) -> (&'a str, &'a str, f64) {
        use self::keys::*;
        match self {
            DerivedMetric::Frequency => (IMPRESSIONS, REACH, 1.0),
            DerivedMetric::Cpr => (SPENT, REACH, 1.0),
            DerivedMetric::Ctr => (CLICKS, IMPRESSIONS, 100.0),
            DerivedMetric::Cpc => (SPENT, CLICKS, 1.0),
            DerivedMetric::ConRate => (CONVERSIONS, CLICKS, 100.0),
            DerivedMetric::Cpl => (SPENT, CONVERSIONS, 1.0),
            DerivedMetric::Cpm => (SPENT, IMPRESSIONS, 1000.0),
            DerivedMetric::Cpv => (SPENT, VIDEO_VIEWS, 1.0),
            DerivedMetric::Cpe => (SPENT, ENGAGEMENTS, 1.0),
            DerivedMetric::Cpa => (SPENT, action_key, 1.0),
            DerivedMetric::Roas => (CONVERSION_VALUE, SPENT, 1.0),
            DerivedMetric::EngagementRate => (ENGAGEMENTS, IMPRESSIONS, 100.0),
            DerivedMetric::ViewRate => (VIDEO_VIEWS, IMPRESSIONS, 100.0),
        }
    }
}

impl fmt::Display for DerivedMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Missing operands count as zero; a `NoData` operand poisons the result.
fn operand(record: &MetricRecord, key: &str) -> Option<f64> {
    match record.get(key) {
        Some(MetricValue::Value(v)) => Some(*v),
        Some(MetricValue::NoData) => None,
        None => Some(0.0),
    }
}

/// Computes a configured set of derived metrics.
#[derive(Debug, Clone)]
pub struct MetricCalculator {
    metrics: Vec<DerivedMetric>,
    action_key: String,
}

impl MetricCalculator {
    pub fn new(metrics: Vec<DerivedMetric>, action_key: impl Into<String>) -> Self {
        Self {
            metrics,
            action_key: action_key.into(),
        }
    }

    /// Every derived metric, with `cpa` priced per conversion.
    pub fn all() -> Self {
        Self::new(DerivedMetric::ALL.to_vec(), keys::CONVERSIONS)
    }

    pub fn metrics(&self) -> &[DerivedMetric] {
        &self.metrics
    }

    pub fn compute(&self, metric: DerivedMetric, record: &MetricRecord) -> MetricValue {
        let (num, den, scale) = metric.operands(&self.action_key);
        match (operand(record, num), operand(record, den)) {
            (Some(n), Some(d)) => MetricValue::Value(safe_div(n, d) * scale),
            _ => MetricValue::NoData,
        }
    }

    /// Copy of `record` with every configured derived metric added.
    pub fn derive(&self, record: &MetricRecord) -> MetricRecord {
        let mut out = record.clone();
        for metric in &self.metrics {
            out.insert(metric.key().to_string(), self.compute(*metric, record));
        }
        out
    }

    pub fn derive_groups(
        &self,
        groups: &HashMap<String, MetricRecord>,
    ) -> HashMap<String, MetricRecord> {
        groups
            .iter()
            .map(|(name, record)| (name.clone(), self.derive(record)))
            .collect()
    }
}

/// Add all derived metrics to a record using the default `cpa` definition.
pub fn derive_metrics(record: &MetricRecord) -> MetricRecord {
    MetricCalculator::all().derive(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(pairs: &[(&str, f64)]) -> MetricRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), MetricValue::Value(*v)))
            .collect()
    }

    fn value(r: &MetricRecord, key: &str) -> f64 {
        r[key].as_f64().expect("numeric")
    }

    #[test]
    fn computes_the_formula_table() {
        let r = derive_metrics(&record(&[
            ("impressions", 20_000.0),
            ("clicks", 400.0),
            ("conversions", 20.0),
            ("spent", 500.0),
            ("reach", 8_000.0),
            ("videoViews", 5_000.0),
            ("engagements", 1_000.0),
            ("conversionValue", 1_500.0),
        ]));
        assert_eq!(value(&r, "ctr"), 2.0);
        assert_eq!(value(&r, "conRate"), 5.0);
        assert_eq!(value(&r, "cpl"), 25.0);
        assert_eq!(value(&r, "cpc"), 1.25);
        assert_eq!(value(&r, "cpm"), 25.0);
        assert_eq!(value(&r, "cpv"), 0.1);
        assert_eq!(value(&r, "cpe"), 0.5);
        assert_eq!(value(&r, "cpa"), 25.0);
        assert_eq!(value(&r, "cpr"), 0.0625);
        assert_eq!(value(&r, "roas"), 3.0);
        assert_eq!(value(&r, "engagementRate"), 5.0);
        assert_eq!(value(&r, "viewRate"), 25.0);
        assert_eq!(value(&r, "frequency"), 2.5);
        // base metrics are carried through
        assert_eq!(value(&r, "spent"), 500.0);
    }

    #[test]
    fn cpa_uses_the_configured_action() {
        let calc = MetricCalculator::new(vec![DerivedMetric::Cpa], "leads");
        let r = calc.derive(&record(&[("spent", 90.0), ("leads", 3.0), ("conversions", 9.0)]));
        assert_eq!(value(&r, "cpa"), 30.0);
        assert!(!r.contains_key("cpl"));
    }

    #[test]
    fn missing_operands_yield_zero() {
        let r = derive_metrics(&record(&[("spent", 100.0)]));
        for metric in DerivedMetric::ALL {
            assert_eq!(value(&r, metric.key()), 0.0, "{metric}");
        }
    }

    #[test]
    fn no_data_propagates() {
        let mut totals = MetricRecord::new();
        totals.insert("impressions".into(), MetricValue::NoData);
        totals.insert("clicks".into(), MetricValue::NoData);
        let r = MetricCalculator::new(vec![DerivedMetric::Ctr], "conversions").derive(&totals);
        assert_eq!(r["ctr"], MetricValue::NoData);
    }

    #[test]
    fn cvr_alias_deserializes() {
        let m: Vec<DerivedMetric> =
            serde_json::from_str(r#"["cvr","conRate","engagementRate"]"#).expect("metrics");
        assert_eq!(
            m,
            vec![
                DerivedMetric::ConRate,
                DerivedMetric::ConRate,
                DerivedMetric::EngagementRate
            ]
        );
    }

    proptest! {
        #[test]
        fn zero_denominators_never_leak_nan(numerator in 0.0f64..1e9) {
            let r = derive_metrics(&record(&[
                ("impressions", 0.0),
                ("clicks", 0.0),
                ("conversions", 0.0),
                ("reach", 0.0),
                ("videoViews", 0.0),
                ("engagements", 0.0),
                ("spent", 0.0),
                ("conversionValue", numerator),
            ]));
            for metric in DerivedMetric::ALL {
                prop_assert_eq!(r[metric.key()], MetricValue::Value(0.0));
            }
        }

        #[test]
        fn derived_values_are_always_finite(
            impressions in 0.0f64..1e7,
            clicks in 0.0f64..1e5,
            spent in 0.0f64..1e6,
        ) {
            let r = derive_metrics(&record(&[
                ("impressions", impressions),
                ("clicks", clicks),
                ("spent", spent),
            ]));
            for metric in DerivedMetric::ALL {
                prop_assert!(value(&r, metric.key()).is_finite());
            }
        }
    }
}
