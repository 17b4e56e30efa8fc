use ad_report::aggregate::aggregate;
use ad_report::compare::compare;
use ad_report::format::format_metric;
use ad_report::metrics::derive_metrics;
use ad_report::normalize::{normalize, FieldSpec};
use ad_report::period::{previous_period, DateWindow};
use ad_report::platform::{PlatformConfig, PlatformRegistry};
use ad_report::{run, Cell, DatasetStore, MetricRecord, MetricValue, RawRow};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

fn raw(pairs: &[(&str, &str)]) -> RawRow {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Cell::from(*v)))
        .collect()
}

fn num(r: &MetricRecord, key: &str) -> f64 {
    r[key].as_f64().expect("numeric")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("date")
}

fn fb_rows() -> Vec<RawRow> {
    vec![
        raw(&[
            ("Channel", "FB"),
            ("Impressions", "1,000"),
            ("Clicks", "50"),
            ("Conversions", "5"),
            ("Spent", "100"),
        ]),
        raw(&[
            ("Channel", "FB"),
            ("Impressions", "2,000"),
            ("Clicks", "100"),
            ("Conversions", "10"),
            ("Spent", "200"),
        ]),
    ]
}

#[test]
fn engine_stages_compose_on_raw_rows() {
    let metrics = ["Impressions", "Clicks", "Conversions", "Spent"];
    let rows = normalize(&fb_rows(), &FieldSpec::new(metrics, None));
    let agg = aggregate(&rows, &metrics, "Channel");
    let fb = &agg.groups["FB"];
    assert_eq!(num(fb, "Impressions"), 3000.0);
    assert_eq!(num(fb, "Clicks"), 150.0);
    assert_eq!(num(fb, "Conversions"), 15.0);
    assert_eq!(num(fb, "Spent"), 300.0);
    assert_eq!(agg.totals, *fb);
}

#[test]
fn end_to_end_scenario_through_platform_config() {
    let config: PlatformConfig = serde_json::from_str(
        r#"{
            "id": "fb",
            "name": "Facebook",
            "endpoint": "/api/sheets/fb",
            "groupBy": "Channel",
            "baseMetrics": [
                {"canonical": "impressions", "source": "Impressions"},
                {"canonical": "clicks", "source": "Clicks"},
                {"canonical": "conversions", "source": "Conversions"},
                {"canonical": "spent", "source": "Spent"}
            ],
            "derivedMetrics": ["ctr", "conRate", "cpl"]
        }"#,
    )
    .expect("config");

    let report = run(&config, &fb_rows(), None);
    let fb = &report.groups["FB"];
    assert_eq!(num(fb, "impressions"), 3000.0);
    assert_eq!(num(fb, "clicks"), 150.0);
    assert_eq!(num(fb, "conversions"), 15.0);
    assert_eq!(num(fb, "spent"), 300.0);
    assert_eq!(format_metric("ctr", &fb["ctr"]), "5.00%");
    assert_eq!(format_metric("conRate", &fb["conRate"]), "10.00%");
    assert_eq!(format_metric("cpl", &fb["cpl"]), "20.00");
    assert_eq!(num(fb, "ctr"), 5.0);
    assert_eq!(num(fb, "cpl"), 20.0);
}

#[test]
fn derived_metrics_apply_to_groups_and_totals_alike() {
    let metrics = ["impressions", "clicks"];
    let rows: Vec<RawRow> = vec![
        raw(&[("Channel", "FB"), ("impressions", "400"), ("clicks", "4")]),
        raw(&[("Channel", ""), ("impressions", "100"), ("clicks", "6")]),
    ];
    let rows = normalize(&rows, &FieldSpec::new(metrics, None));
    let agg = aggregate(&rows, &metrics, "Channel");
    let unknown = derive_metrics(&agg.groups["Unknown"]);
    let totals = derive_metrics(&agg.totals);
    assert_eq!(num(&unknown, "ctr"), 6.0);
    assert_eq!(num(&totals, "ctr"), 2.0);
    assert_eq!(num(&totals, "impressions"), 500.0);
}

#[test]
fn comparison_edge_cases() {
    let rec = |v: f64| -> MetricRecord { [("x".to_string(), MetricValue::Value(v))].into() };
    assert_eq!(compare(&rec(0.0), &rec(0.0))["x"], 0.0);
    assert_eq!(compare(&rec(5.0), &rec(0.0))["x"], 100.0);
    assert_eq!(compare(&rec(0.0), &rec(5.0))["x"], -100.0);
}

#[test]
fn previous_period_of_three_day_window() {
    let prev = previous_period(&DateWindow::new(date(2024, 1, 10), date(2024, 1, 12)));
    assert_eq!(prev, DateWindow::new(date(2024, 1, 7), date(2024, 1, 9)));
}

#[test]
fn builtin_platform_runs_on_its_own_columns() {
    let mut store = DatasetStore::new(PlatformRegistry::builtin());
    let table = vec![
        vec![
            "Campaign", "Day", "Impr.", "Clicks", "Cost", "Conversions", "Conv. value",
        ],
        vec!["Brand", "2024-03-02", "10,000", "500", "250.00", "25", "1,000"],
        vec!["Brand", "2024-02-28", "5,000", "100", "100.00", "10", "200"],
        vec!["", "2024-03-03", "1,000", "10", "", "", ""],
    ]
    .into_iter()
    .map(|r| r.into_iter().map(Cell::from).collect())
    .collect::<Vec<Vec<Cell>>>();

    store.ingest_table("google_ads", &table).expect("ingest");
    store.set_window(DateWindow::from_bounds(Some("2024-03-01"), Some("2024-03-04")));

    let dataset = store.get("google_ads").expect("dataset");
    let brand = &dataset.groups()["Brand"];
    assert_eq!(num(brand, "cpa"), 10.0);
    assert_eq!(num(brand, "roas"), 4.0);
    assert_eq!(num(&dataset.groups()["Unknown"], "cpc"), 0.0);
    assert_eq!(num(dataset.totals(), "impressions"), 11_000.0);

    // previous window is 2024-02-26..2024-02-29
    let cmp = dataset.comparison().expect("comparison");
    assert_eq!(cmp["impressions"], 120.0);
    assert_eq!(cmp["clicks"], 410.0);
    assert_eq!(dataset.raw_rows.len(), 3);
    assert_eq!(dataset.report.rows, 2);
}
