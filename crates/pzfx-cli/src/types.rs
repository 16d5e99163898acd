use std::path::PathBuf;

use pzfx_layout::{GroupingSpec, LayoutWarning};
use pzfx_model::{FlatRecord, Table, TableKind};

/// Everything `pzfx build` needs, after flags and the spec file are merged.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub input: PathBuf,
    /// Sheet to read when the input is a workbook; the first sheet otherwise.
    pub sheet: Option<String>,
    pub output: PathBuf,
    pub table: String,
    pub grouping: GroupingSpec,
    /// Add the table to the existing output document instead of starting fresh.
    pub append: bool,
    /// Replace a table of the same name.
    pub overwrite: bool,
    pub strict: bool,
    pub decimals: Option<usize>,
    /// Build in memory only and return the flattened preview.
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct BuildResult {
    pub output: PathBuf,
    pub table: TableSummary,
    pub tables_in_document: usize,
    pub warnings: Vec<LayoutWarning>,
    pub preview: Option<Vec<FlatRecord>>,
    pub written: bool,
}

/// Shape of one table, as listed by `pzfx tables`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub name: String,
    pub kind: TableKind,
    pub rows: usize,
    pub y_columns: usize,
    pub subcolumns: usize,
    /// Non-missing cells.
    pub values: usize,
}

impl TableSummary {
    pub fn from_table(table: &Table) -> Self {
        Self {
            name: table.name.clone(),
            kind: table.kind,
            rows: table.row_count(),
            y_columns: table.y_columns.len(),
            subcolumns: table.subcolumn_count(),
            values: table
                .y_columns
                .iter()
                .flat_map(|column| &column.subcolumns)
                .map(pzfx_model::Subcolumn::value_count)
                .sum(),
        }
    }
}
