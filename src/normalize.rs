// Field cleaning for raw platform rows.
//
// Numeric columns are coerced to `f64` (thousands separators stripped,
// garbage becomes `0`), every other column is trimmed text, and the date
// column is left exactly as delivered so string date comparisons stay stable.

use std::collections::HashSet;

use crate::platform::FieldMapping;
use crate::types::{Cell, RawRow};

/// Column roles used while cleaning one dataset.
#[derive(Debug, Clone, Default)]
pub struct FieldSpec<'a> {
    pub numeric: HashSet<&'a str>,
    pub date_field: Option<&'a str>,
}

impl<'a> FieldSpec<'a> {
    pub fn new<I>(numeric: I, date_field: Option<&'a str>) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            numeric: numeric.into_iter().collect(),
            date_field,
        }
    }
}

fn clean_numeric(cell: Option<&Cell>) -> Cell {
    Cell::Number(cell.map(Cell::as_f64).unwrap_or(0.0))
}

fn clean_text(cell: &Cell) -> Cell {
    match cell {
        Cell::Text(s) => Cell::Text(s.trim().to_string()),
        other => Cell::Text(other.as_string()),
    }
}

/// Clean every row according to `spec`, returning a new collection.
///
/// A numeric column missing from a row is filled with `0`; missing text
/// columns stay absent.
pub fn normalize(rows: &[RawRow], spec: &FieldSpec<'_>) -> Vec<RawRow> {
    rows.iter()
        .map(|row| {
            let mut out = RawRow::new();
            for (key, cell) in row {
                let cleaned = if spec.date_field == Some(key.as_str()) {
                    cell.clone()
                } else if spec.numeric.contains(key.as_str()) {
                    clean_numeric(Some(cell))
                } else {
                    clean_text(cell)
                };
                out.insert(key.clone(), cleaned);
            }
            for key in &spec.numeric {
                if !out.contains_key(*key) {
                    out.insert((*key).to_string(), clean_numeric(None));
                }
            }
            out
        })
        .collect()
}

/// Rename platform source columns to their canonical metric keys.
///
/// Columns without a mapping are carried over unchanged. A source shared by
/// several mappings fills every one of their canonical keys. When a source
/// and a canonical name collide the mapped value wins.
pub fn apply_field_map(rows: Vec<RawRow>, mappings: &[FieldMapping]) -> Vec<RawRow> {
    if mappings.iter().all(|m| m.source == m.canonical) {
        return rows;
    }
    rows.into_iter()
        .map(|mut row| {
            let renamed: Vec<(String, Cell)> = mappings
                .iter()
                .filter_map(|m| Some((m.canonical.clone(), row.get(&m.source)?.clone())))
                .collect();
            for m in mappings {
                row.remove(&m.source);
            }
            row.extend(renamed);
            row
        })
        .collect()
}
