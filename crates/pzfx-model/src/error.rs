use thiserror::Error;

use crate::table::TableKind;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("table '{name}' already exists")]
    NamingConflict { name: String },
    #[error("table name must not be empty")]
    InvalidTableName,
    #[error("table '{name}' not found")]
    TableNotFound { name: String },
    #[error("table '{table}' is not rectangular: {message}")]
    RaggedTable { table: String, message: String },
    #[error("table '{table}' does not fit kind {kind}: {message}")]
    KindMismatch {
        table: String,
        kind: TableKind,
        message: String,
    },
    #[error("duplicate source column: {name}")]
    DuplicateColumn { name: String },
    #[error("source column '{name}' has {actual} rows, expected {expected}")]
    ColumnLengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
