// Spreadsheet reader collaborator: one sheet in, one raw cell grid out.
//
// Excel-family workbooks go through calamine; `.csv` files are treated as
// single-sheet workbooks and read with the csv crate. Either way the
// pipeline only ever sees the schema-less `Grid`.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use log::info;

use crate::error::RcaError;
use crate::grid::{Cell, Grid, SheetSelector};

/// Read the selected sheet of a workbook into a raw grid.
pub fn load_grid(path: &str, selector: &SheetSelector) -> Result<Grid, RcaError> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let grid = match ext.as_str() {
        "csv" => load_csv_grid(path, selector)?,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook_grid(path, selector)?,
        other => {
            return Err(RcaError::Workbook(format!(
                "unsupported workbook extension '{}' for {}",
                other, path
            )))
        }
    };
    info!("{}: loaded {} rows", path, grid.len());
    Ok(grid)
}

fn load_workbook_grid(path: &str, selector: &SheetSelector) -> Result<Grid, RcaError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| RcaError::Workbook(format!("{}: {}", path, e)))?;
    let names = workbook.sheet_names().to_owned();
    let name = match selector {
        SheetSelector::Index(i) => names.get(*i).cloned().ok_or_else(|| {
            RcaError::Workbook(format!(
                "{}: sheet index {} out of range ({} sheets)",
                path,
                i,
                names.len()
            ))
        })?,
        SheetSelector::Name(n) => names
            .iter()
            .find(|s| *s == n)
            .cloned()
            .ok_or_else(|| RcaError::Workbook(format!("{}: no sheet named '{}'", path, n)))?,
    };
    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| RcaError::Workbook(format!("{}: {}", path, e)))?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(convert_cell).collect())
        .collect())
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Text(b.to_string()),
        // Date serials stay numeric; the KPI columns we parse are plain
        // numbers, and category cells render through `cell_text` anyway.
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) => Cell::Empty,
    }
}

/// A CSV file is a workbook with exactly one unnamed sheet: index 0 or the
/// file stem select it, anything else is out of range.
fn load_csv_grid(path: &str, selector: &SheetSelector) -> Result<Grid, RcaError> {
    let stem = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    match selector {
        SheetSelector::Index(0) => {}
        SheetSelector::Name(n) if n.as_str() == stem => {}
        other => {
            return Err(RcaError::Workbook(format!(
                "{}: csv workbooks have a single sheet, selector {:?} does not match",
                path, other
            )))
        }
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut grid: Grid = Vec::new();
    for record in rdr.records() {
        let record = record?;
        grid.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(grid)
}
