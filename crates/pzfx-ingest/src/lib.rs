//! Tabular input for the Prism layout engine.
//!
//! Loads CSV files and spreadsheet workbooks into
//! [`SourceTable`](pzfx_model::SourceTable)s, classifying
//! each column once as numeric or categorical, and converts between polars
//! data frames and the layout model.

pub mod csv_table;
mod error;
pub mod excel;
pub mod frame;
pub mod polars_utils;

pub use csv_table::{
    CsvTable, IngestOptions, parse_csv, read_csv_table, read_csv_table_with_options,
    read_source_table, read_source_table_from_sheet,
};
pub use error::{IngestError, Result};
pub use excel::{is_workbook, read_workbook_table, sheet_names};
pub use frame::{records_to_dataframe, source_from_dataframe, source_to_dataframe};
pub use polars_utils::{any_to_f64, any_to_string};
