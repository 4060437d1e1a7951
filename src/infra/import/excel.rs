use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, DataType, Reader};

use crate::domain::entities::table::{CellValue, DataTable};

/// Read the first worksheet of an `.xlsx`/`.xls` file into a [`DataTable`].
/// Row 0 is the header row; everything below becomes typed cells.
pub fn import_excel(path: &Path) -> Result<DataTable> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open spreadsheet: {}", path.display()))?;

    let range = workbook
        .worksheet_range_at(0)
        .with_context(|| format!("workbook has no worksheet: {}", path.display()))?
        .with_context(|| format!("failed to read first worksheet: {}", path.display()))?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .with_context(|| format!("header row is required: {}", path.display()))?;

    let columns: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(idx, cell)| header_name(cell, idx))
        .collect();
    if columns.iter().all(|name| name.starts_with("Unnamed: ")) {
        anyhow::bail!("header row is empty: {}", path.display());
    }

    let data_rows: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(cell_to_value).collect())
        .collect();

    Ok(DataTable::new(columns, data_rows))
}

fn header_name(cell: &Data, idx: usize) -> String {
    let name = cell_to_value(cell).display();
    if name.trim().is_empty() {
        format!("Unnamed: {idx}")
    } else {
        name
    }
}

/// Booleans and cell errors land as text on purpose: a column containing
/// them must not count as numeric.
fn cell_to_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Missing,
        Data::String(v) => {
            if v.is_empty() {
                CellValue::Missing
            } else {
                CellValue::Text(v.clone())
            }
        }
        Data::Float(v) => CellValue::Number(*v),
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Bool(v) => CellValue::Text(v.to_string()),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(datetime) => CellValue::Date(datetime),
            None => CellValue::Missing,
        },
        Data::DurationIso(v) => CellValue::Text(v.clone()),
        Data::Error(v) => CellValue::Text(format!("{v:?}")),
    }
}
