use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use pzfx_model::SourceTable;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::excel::{is_workbook, read_workbook_table};

/// Raw text table: normalized headers plus padded rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Classify each column and build a typed source table.
    pub fn to_source_table(&self) -> Result<SourceTable> {
        Ok(SourceTable::from_text_rows(&self.headers, &self.rows)?)
    }
}

/// CSV dialect options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOptions {
    pub delimiter: u8,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl IngestOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Pick the delimiter from the file extension (`.tsv`/`.tab` use tabs).
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        let is_tab = path
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("tab"));
        if is_tab {
            Self::new().with_delimiter(b'\t')
        } else {
            Self::new()
        }
    }
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

pub(crate) fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Read a CSV file; the first non-blank row is the header.
pub fn read_csv_table(path: &Path) -> Result<CsvTable> {
    read_csv_table_with_options(path, &IngestOptions::for_path(path))
}

pub fn read_csv_table_with_options(path: &Path, options: &IngestOptions) -> Result<CsvTable> {
    let file = std::fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::Io(e)
        }
    })?;
    let table = parse_csv(file, options)?;
    debug!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "read csv table"
    );
    Ok(table)
}

/// Parse CSV text from any reader.
pub fn parse_csv<R: Read>(reader: R, options: &IngestOptions) -> Result<CsvTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_reader(reader);
    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(String::is_empty) {
            continue;
        }
        raw_rows.push(row);
    }
    Ok(text_table(&raw_rows))
}

/// Turn non-blank raw rows into a text table; the first row is the header.
pub(crate) fn text_table(raw_rows: &[Vec<String>]) -> CsvTable {
    let Some((header_row, data_rows)) = raw_rows.split_first() else {
        return CsvTable::default();
    };
    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            let header = normalize_header(value);
            if header.is_empty() {
                format!("Column {}", idx + 1)
            } else {
                header
            }
        })
        .collect();
    let rows = data_rows
        .iter()
        .map(|record| {
            (0..headers.len())
                .map(|idx| record.get(idx).cloned().unwrap_or_default())
                .collect()
        })
        .collect();
    CsvTable { headers, rows }
}

/// Read a CSV or workbook file straight into a typed source table.
///
/// Workbooks are recognised by extension and read from their first sheet.
pub fn read_source_table(path: &Path) -> Result<SourceTable> {
    read_source_table_from_sheet(path, None)
}

/// Like [`read_source_table`], reading the named sheet of a workbook.
///
/// A sheet name on a non-workbook input is an error.
pub fn read_source_table_from_sheet(path: &Path, sheet: Option<&str>) -> Result<SourceTable> {
    if is_workbook(path) {
        return read_workbook_table(path, sheet)?.to_source_table();
    }
    if let Some(sheet) = sheet {
        return Err(IngestError::NotAWorkbook {
            path: path.to_path_buf(),
            sheet: sheet.to_string(),
        });
    }
    read_csv_table(path)?.to_source_table()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_normalization() {
        assert_eq!(normalize_header("\u{feff} Dose   level "), "Dose level");
        assert_eq!(normalize_cell("  x "), "x");
    }

    #[test]
    fn pads_short_rows_and_names_blank_headers() {
        let table = parse_csv("a,,c\n1\n\n,,\n2,3,4,5\n".as_bytes(), &IngestOptions::new()).unwrap();
        assert_eq!(table.headers, vec!["a", "Column 2", "c"]);
        assert_eq!(
            table.rows,
            vec![
                vec!["1".to_string(), String::new(), String::new()],
                vec!["2".to_string(), "3".to_string(), "4".to_string()],
            ]
        );
    }

    #[test]
    fn tab_delimiter_from_extension() {
        assert_eq!(IngestOptions::for_path(Path::new("x.TSV")).delimiter, b'\t');
        assert_eq!(IngestOptions::for_path(Path::new("x.csv")).delimiter, b',');
    }
}
