//! Conversions between polars data frames and the layout model.

use polars::prelude::*;
use pzfx_model::{ColumnData, FlatRecord, SourceColumn, SourceTable};

use crate::error::Result;
use crate::polars_utils::{any_to_f64, any_to_string};

/// Build a source table from a data frame.
///
/// Each column is classified the same way as CSV input: numeric when every
/// non-null cell is a finite number.
pub fn source_from_dataframe(df: &DataFrame) -> Result<SourceTable> {
    let mut columns = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let raw: Vec<String> = (0..df.height())
            .map(|row_idx| any_to_string(column.get(row_idx).unwrap_or(AnyValue::Null)))
            .collect();
        let mut source = SourceColumn::infer(column.name().as_str(), &raw);
        if let ColumnData::Numeric(values) = &mut source.data {
            for (row_idx, value) in values.iter_mut().enumerate() {
                *value = any_to_f64(column.get(row_idx).unwrap_or(AnyValue::Null));
            }
        }
        columns.push(source);
    }
    Ok(SourceTable::new(columns)?)
}

/// Data frame of the source table's columns; numeric columns become `f64`.
pub fn source_to_dataframe(source: &SourceTable) -> Result<DataFrame> {
    let columns: Vec<Column> = source
        .columns()
        .iter()
        .map(|column| match &column.data {
            ColumnData::Numeric(values) => {
                Series::new(column.name.as_str().into(), values.clone()).into_column()
            }
            ColumnData::Categorical(values) => {
                Series::new(column.name.as_str().into(), values.clone()).into_column()
            }
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}

/// Flat records as a data frame with columns
/// `row_index`, `row_label`, `y_column`, `subcolumn`, `value`.
pub fn records_to_dataframe(records: &[FlatRecord]) -> Result<DataFrame> {
    let row_index: Vec<u64> = records.iter().map(|r| r.row_index as u64).collect();
    let row_label: Vec<&str> = records.iter().map(|r| r.row_label.as_str()).collect();
    let y_column: Vec<&str> = records.iter().map(|r| r.y_column.as_str()).collect();
    let subcolumn: Vec<&str> = records.iter().map(|r| r.subcolumn.as_str()).collect();
    let value: Vec<f64> = records.iter().map(|r| r.value).collect();
    let df = DataFrame::new(vec![
        Series::new("row_index".into(), row_index).into_column(),
        Series::new("row_label".into(), row_label).into_column(),
        Series::new("y_column".into(), y_column).into_column(),
        Series::new("subcolumn".into(), subcolumn).into_column(),
        Series::new("value".into(), value).into_column(),
    ])?;
    Ok(df)
}
