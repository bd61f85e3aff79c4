//! Excel reader - worksheets loaded as all-text frames

use crate::error::{LakehouseError, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use polars::prelude::*;
use std::collections::HashSet;

/// Load one worksheet (the first when `sheet` is None).
///
/// The first row is the header; every cell becomes text, empty cells null.
pub fn read_xlsx(path: &str, sheet: Option<&str>) -> Result<DataFrame> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| LakehouseError::Read(format!("{} has no worksheets", path)))?,
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    let mut rows = range.rows();

    let header = match rows.next() {
        Some(row) => header_names(row),
        None => return Ok(DataFrame::empty()),
    };

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); header.len()];
    for row in rows {
        for (idx, values) in columns.iter_mut().enumerate() {
            values.push(row.get(idx).and_then(cell_text));
        }
    }

    let series: Vec<Series> = header
        .iter()
        .zip(columns)
        .map(|(name, values)| Series::new(name, values))
        .collect();

    Ok(DataFrame::new(series)?)
}

/// Header cells as unique, non-empty column names
fn header_names(row: &[Data]) -> Vec<String> {
    let mut seen = HashSet::new();
    row.iter()
        .enumerate()
        .map(|(idx, cell)| {
            let base = cell_text(cell)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| format!("column{}", idx));
            let mut name = base.clone();
            let mut n = 1;
            while !seen.insert(name.clone()) {
                name = format!("{}_{}", base, n);
                n += 1;
            }
            name
        })
        .collect()
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(number_text(*f)),
        Data::Bool(b) => Some(b.to_string()),
        // dates stay as serial numbers; see cleaning::parse_excel_serial
        Data::DateTime(dt) => Some(number_text(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Error(e) => Some(e.to_string()),
    }
}

/// Whole floats render without a fractional part ("45000", not "45000.0")
fn number_text(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
