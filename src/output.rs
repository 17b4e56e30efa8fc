use crate::error::Result;
use crate::reports::ReportTable;
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style};

pub fn write_csv(path: impl AsRef<Path>, table: &ReportTable) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(&table.header)?;
    for r in &table.rows {
        wtr.write_record(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Markdown rendering of the first `max_rows` rows of `table`.
pub fn render_markdown(table: &ReportTable, max_rows: usize) -> Option<String> {
    if table.is_empty() {
        return None;
    }
    let mut builder = Builder::default();
    builder.push_record(table.header.iter().cloned());
    for r in table.rows.iter().take(max_rows) {
        builder.push_record(r.iter().cloned());
    }
    let mut t = builder.build();
    t.with(Style::markdown());
    Some(t.to_string())
}

pub fn preview_table(title: &str, note: Option<&str>, table: &ReportTable, max_rows: usize) {
    println!("{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    match render_markdown(table, max_rows) {
        Some(s) => println!("{}\n", s),
        None => println!("(no rows)\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ReportTable {
        ReportTable {
            header: vec!["Channel".into(), "clicks".into()],
            rows: vec![
                vec!["FB".into(), "1,500".into()],
                vec!["Search".into(), "20".into()],
                vec!["Total".into(), "1,520".into()],
            ],
        }
    }

    #[test]
    fn writes_csv_with_header() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("groups.csv");
        write_csv(&path, &table()).expect("write csv");
        let written = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(written, "Channel,clicks\nFB,\"1,500\"\nSearch,20\nTotal,\"1,520\"\n");
    }

    #[test]
    fn writes_pretty_json() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("summary.json");
        write_json(&path, &serde_json::json!({"rows": 3})).expect("write json");
        let written = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(written, "{\n  \"rows\": 3\n}");
    }

    #[test]
    fn markdown_preview_is_truncated() {
        let md = render_markdown(&table(), 1).expect("rendered");
        assert!(md.contains("Channel"));
        assert!(md.contains("FB"));
        assert!(!md.contains("Search"));
        assert!(render_markdown(&ReportTable::default(), 5).is_none());
    }
}
