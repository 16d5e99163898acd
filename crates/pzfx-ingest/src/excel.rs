//! Excel and OpenDocument workbook input.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use tracing::debug;

use crate::csv_table::{CsvTable, normalize_cell, text_table};
use crate::error::{IngestError, Result};

const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Whether `path` names a spreadsheet workbook, judged by extension.
#[must_use]
pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(std::ffi::OsStr::to_str)
        .is_some_and(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Sheet names of a workbook, in workbook order.
pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
    ensure_exists(path)?;
    let workbook = open_workbook_auto(path)?;
    Ok(workbook.sheet_names())
}

/// Read one sheet of a workbook as a text table.
///
/// Without a sheet name the first sheet is read. Cells are rendered as text
/// the way a CSV export would show them, so both inputs classify columns
/// the same way.
pub fn read_workbook_table(path: &Path, sheet: Option<&str>) -> Result<CsvTable> {
    ensure_exists(path)?;
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names();
    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|name| name.as_str() == wanted)
            .cloned()
            .ok_or_else(|| IngestError::SheetNotFound {
                sheet: wanted.to_string(),
                available: names.clone(),
            })?,
        None => names.first().cloned().ok_or(IngestError::EmptyWorkbook {
            path: path.to_path_buf(),
        })?,
    };
    let range = workbook.worksheet_range(&name)?;

    let raw_rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect();
    let table = text_table(&raw_rows);
    debug!(
        path = %path.display(),
        sheet = %name,
        columns = table.headers.len(),
        rows = table.rows.len(),
        "read workbook sheet"
    );
    Ok(table)
}

/// Render a cell as text.
///
/// Numbers keep their shortest round-trip form; dates stay as Excel serial
/// numbers; error cells keep their `#` code and later fail numeric coercion.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => {
            normalize_cell(text)
        }
        Data::Float(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => String::from(if *value { "TRUE" } else { "FALSE" }),
        Data::DateTime(value) => value.as_f64().to_string(),
        Data::Error(error) => error.to_string(),
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}
