//! Excel workbook loading via calamine.

use crate::error::{PipelineError, Result};
use crate::utils::dedupe_names;
use calamine::{Data, Range, Reader, open_workbook_auto};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, warn};

static EMPTY_CELL: Data = Data::Empty;

/// Column type inferred from the non-empty cells of a worksheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Empty,
    Int,
    Float,
    Bool,
    Text,
}

impl CellKind {
    fn of(cell: &Data) -> Self {
        match cell {
            Data::Empty => Self::Empty,
            Data::Int(_) => Self::Int,
            Data::Float(_) => Self::Float,
            Data::Bool(_) => Self::Bool,
            _ => Self::Text,
        }
    }

    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Empty, k) | (k, Self::Empty) => k,
            (a, b) if a == b => a,
            (Self::Int, Self::Float) | (Self::Float, Self::Int) => Self::Float,
            _ => Self::Text,
        }
    }
}

/// Load a worksheet into a DataFrame.
///
/// The sheet named `preferred_sheet` is tried first; if it is missing or
/// cannot be read the first sheet of the workbook is used instead.
pub fn load_excel(path: &Path, preferred_sheet: &str) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| PipelineError::ExcelReadFailed(format!("{}: {}", path.display(), e)))?;

    let range = match workbook.worksheet_range(preferred_sheet) {
        Ok(range) => {
            debug!("Reading sheet '{}'", preferred_sheet);
            range
        }
        Err(e) => {
            warn!(
                "Sheet '{}' unavailable ({}); falling back to the first sheet",
                preferred_sheet, e
            );
            let first = workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| PipelineError::ExcelReadFailed("workbook has no sheets".into()))?;
            workbook
                .worksheet_range(&first)
                .map_err(|e| PipelineError::ExcelReadFailed(format!("sheet '{}': {}", first, e)))?
        }
    };

    range_to_dataframe(&range)
}

/// Convert a cell range (header row first) into a DataFrame.
fn range_to_dataframe(range: &Range<Data>) -> Result<DataFrame> {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(DataFrame::empty());
    };
    let headers = unique_headers(header_row);
    let body: Vec<&[Data]> = rows.collect();

    let mut columns = Vec::with_capacity(headers.len());
    for (idx, name) in headers.iter().enumerate() {
        let cells: Vec<&Data> = body
            .iter()
            .map(|row| row.get(idx).unwrap_or(&EMPTY_CELL))
            .collect();
        columns.push(build_series(name, &cells).into_column());
    }

    Ok(DataFrame::new(columns)?)
}

/// Header labels with blanks named by position and duplicates suffixed `.1`, `.2`, ...
fn unique_headers(header_row: &[Data]) -> Vec<String> {
    dedupe_names(header_row.iter().enumerate().map(|(idx, cell)| {
        match cell_to_string(cell) {
            Some(label) if !label.trim().is_empty() => label,
            _ => format!("column_{}", idx + 1),
        }
    }))
}

fn build_series(name: &str, cells: &[&Data]) -> Series {
    let kind = cells
        .iter()
        .fold(CellKind::Empty, |acc, cell| acc.merge(CellKind::of(cell)));

    match kind {
        CellKind::Int => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|cell| match cell {
                    Data::Int(i) => Some(*i),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        CellKind::Float => {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|cell| match cell {
                    Data::Int(i) => Some(*i as f64),
                    Data::Float(f) => Some(*f),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        CellKind::Bool => {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|cell| match cell {
                    Data::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        CellKind::Empty | CellKind::Text => {
            let values: Vec<Option<String>> = cells.iter().map(|cell| cell_to_string(cell)).collect();
            Series::new(name.into(), values)
        }
    }
}

/// Render a cell as text. Dates use `YYYY-MM-DD HH:MM:SS` so the cleaner can parse them.
fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                Some(format!("{:.0}", f))
            } else {
                Some(f.to_string())
            }
        }
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        Data::DateTimeIso(s) => Some(s.clone()),
        Data::DurationIso(s) => Some(s.clone()),
        Data::Error(_) => None,
    }
}
