use crate::error::Result;
use crate::types::{Cell, RawRow};
use csv::ReaderBuilder;
use std::path::Path;
use tracing::{debug, warn};

/// Array-of-arrays table as returned by the spreadsheet API: the first row
/// holds the column names.
pub type Table = Vec<Vec<Cell>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub skipped_rows: usize,
}

/// Read a CSV file into a [`Table`], header row included.
///
/// Records may have differing lengths; every cell is kept as text.
pub fn read_table(path: impl AsRef<Path>) -> Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path.as_ref())?;
    let mut table = Table::new();
    for result in rdr.records() {
        let record = result?;
        table.push(record.iter().map(Cell::from).collect());
    }
    debug!(path = %path.as_ref().display(), rows = table.len(), "read table");
    Ok(table)
}

/// Convert a table into keyed rows.
///
/// Short data rows leave the trailing columns absent, surplus cells and
/// columns with a blank header are dropped, and fully blank rows are skipped.
pub fn rows_from_table(table: &[Vec<Cell>]) -> (Vec<RawRow>, LoadReport) {
    let Some((header, data)) = table.split_first() else {
        return (Vec::new(), LoadReport::default());
    };
    let columns: Vec<Option<String>> = header
        .iter()
        .map(|c| {
            let name = c.as_string().trim().to_string();
            if name.is_empty() {
                None
            } else {
                Some(name)
            }
        })
        .collect();

    let mut rows = Vec::with_capacity(data.len());
    let mut skipped_rows = 0usize;
    for values in data {
        if values.iter().all(Cell::is_blank) {
            skipped_rows += 1;
            continue;
        }
        let row: RawRow = columns
            .iter()
            .zip(values)
            .filter_map(|(col, cell)| col.as_ref().map(|name| (name.clone(), cell.clone())))
            .collect();
        rows.push(row);
    }
    if skipped_rows > 0 {
        warn!(skipped_rows, "skipped blank table rows");
    }

    let report = LoadReport {
        total_rows: data.len(),
        loaded_rows: rows.len(),
        skipped_rows,
    };
    (rows, report)
}
