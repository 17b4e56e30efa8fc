// Rendering of metric values for tables and slides.
//
// The rules are keyed on the metric name: rates get a `%` suffix, cost-per
// ratios get two decimals, money gets two decimals with separators and
// everything else is a count. `NoData` always renders as `"No Data"`.

use crate::types::{MetricValue, NO_DATA};
use crate::util::{format_number, round2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Rate,
    Ratio,
    Money,
    Count,
}

const RATE_KEYS: [&str; 5] = ["ctr", "conRate", "cvr", "engagementRate", "viewRate"];
const RATIO_KEYS: [&str; 9] = [
    "cpl", "cpc", "cpm", "cpv", "cpe", "cpa", "cpr", "roas", "frequency",
];
const MONEY_KEYS: [&str; 2] = ["spent", "conversionValue"];

pub fn metric_kind(key: &str) -> MetricKind {
    if RATE_KEYS.contains(&key) || key.ends_with("Rate") || key.ends_with("rate") {
        MetricKind::Rate
    } else if RATIO_KEYS.contains(&key) {
        MetricKind::Ratio
    } else if MONEY_KEYS.contains(&key) {
        MetricKind::Money
    } else {
        MetricKind::Count
    }
}

pub fn format_value(key: &str, value: f64) -> String {
    match metric_kind(key) {
        MetricKind::Rate => format!("{:.2}%", round2(value)),
        MetricKind::Ratio => format!("{:.2}", round2(value)),
        MetricKind::Money => format_number(value, 2),
        MetricKind::Count => format_count(value),
    }
}

/// Counts keep up to three fractional digits (summed conversions are often
/// fractional); trailing zeros and a dangling point are dropped.
fn format_count(value: f64) -> String {
    let s = format_number(value, 3);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Render a metric for display; the "no data" sentinel passes through verbatim.
pub fn format_metric(key: &str, value: &MetricValue) -> String {
    match value {
        MetricValue::Value(v) => format_value(key, *v),
        MetricValue::NoData => NO_DATA.to_string(),
    }
}

/// Render a period comparison as a signed percentage, e.g. `+12.50%`.
pub fn format_change(pct: f64) -> String {
    let pct = round2(pct);
    if pct > 0.0 {
        format!("+{:.2}%", pct)
    } else {
        format!("{:.2}%", pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_get_percent_suffix() {
        assert_eq!(format_metric("ctr", &MetricValue::Value(5.0)), "5.00%");
        assert_eq!(format_metric("engagementRate", &MetricValue::Value(1.23456)), "1.23%");
        assert_eq!(format_metric("bounce_rate", &MetricValue::Value(40.0)), "40.00%");
    }

    #[test]
    fn cost_per_metrics_have_two_decimals() {
        assert_eq!(format_metric("cpl", &MetricValue::Value(20.0)), "20.00");
        assert_eq!(format_metric("cpm", &MetricValue::Value(12345.678)), "12345.68");
        assert_eq!(format_metric("frequency", &MetricValue::Value(2.5)), "2.50");
    }

    #[test]
    fn counts_and_money_use_separators() {
        assert_eq!(format_metric("impressions", &MetricValue::Value(1234567.0)), "1,234,567");
        assert_eq!(format_metric("clicks", &MetricValue::Value(0.0)), "0");
        assert_eq!(format_metric("spent", &MetricValue::Value(12500.5)), "12,500.50");
    }

    #[test]
    fn fractional_counts_keep_their_fraction() {
        assert_eq!(format_metric("conversions", &MetricValue::Value(12.5)), "12.5");
        assert_eq!(format_metric("conversions", &MetricValue::Value(0.4)), "0.4");
        assert_eq!(format_metric("conversions", &MetricValue::Value(1234.125)), "1,234.125");
        assert_eq!(format_metric("leads", &MetricValue::Value(2.0004)), "2");
    }

    #[test]
    fn no_data_passes_through() {
        for key in ["ctr", "cpl", "spent", "impressions"] {
            assert_eq!(format_metric(key, &MetricValue::NoData), "No Data");
        }
    }

    #[test]
    fn changes_are_signed() {
        assert_eq!(format_change(12.5), "+12.50%");
        assert_eq!(format_change(-3.0), "-3.00%");
        assert_eq!(format_change(0.0), "0.00%");
        assert_eq!(format_change(-0.001), "0.00%");
    }
}
