//! Inverse layout: a table back to flat records.

use pzfx_model::{Cell, FlatRecord, Table};

/// Flatten a table into one record per non-missing cell.
///
/// Records come out row by row; within a row, Y columns and then subcolumns
/// in table order. Missing cells are left out.
#[must_use]
pub fn flatten_table(table: &Table) -> Vec<FlatRecord> {
    let mut records = Vec::new();
    for (row_index, row_label) in table.row_labels.iter().enumerate() {
        for column in &table.y_columns {
            for sub in &column.subcolumns {
                let Some(value) = sub.values.get(row_index).and_then(Cell::value) else {
                    continue;
                };
                records.push(FlatRecord {
                    row_index,
                    row_label: row_label.clone(),
                    y_column: column.title.clone(),
                    subcolumn: sub.title.clone(),
                    value,
                });
            }
        }
    }
    records
}
