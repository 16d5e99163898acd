use std::path::PathBuf;

use polars::prelude::PolarsError;
use pzfx_model::ModelError;
use thiserror::Error;

/// Errors raised while loading or converting tabular input.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("workbook error: {0}")]
    Excel(#[from] calamine::Error),

    #[error("sheet '{sheet}' not found; available: {}", available.join(", "))]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    #[error("workbook has no sheets: {path}")]
    EmptyWorkbook { path: PathBuf },

    #[error("{path} is not a workbook; cannot select sheet '{sheet}'")]
    NotAWorkbook { path: PathBuf, sheet: String },

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, IngestError>;
