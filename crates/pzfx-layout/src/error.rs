//! Error and warning types for table layout.

use pzfx_model::ModelError;
use thiserror::Error;

/// Errors that abort a layout; no table is produced.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Invalid or contradictory grouping specification.
    #[error("invalid grouping: {message}")]
    Configuration { message: String },

    /// Grouping or data column not present in the source.
    #[error("unknown column: {column}")]
    UnknownColumn { column: String },

    /// Non-numeric data cell in strict mode.
    #[error("column '{column}' row {row}: '{raw}' is not a number")]
    NotNumeric {
        column: String,
        row: usize,
        raw: String,
    },

    /// Document-level failure (naming conflict, missing table).
    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, LayoutError>;

impl LayoutError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn unknown_column(column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            column: column.into(),
        }
    }
}

/// Non-fatal issues collected during a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutWarning {
    /// A data cell could not be read as a number and was stored as no value.
    ValueCoercion {
        column: String,
        row: usize,
        raw: String,
    },
    /// A record had a blank grouping key and was left out of the table.
    MissingGroupKey { column: String, row: usize },
}

impl std::fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ValueCoercion { column, row, raw } => {
                write!(f, "column '{column}' row {row}: '{raw}' is not a number; stored as no value")
            }
            Self::MissingGroupKey { column, row } => {
                write!(f, "row {row} skipped: grouping column '{column}' is blank")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LayoutError::configuration("nothing to build");
        assert_eq!(format!("{err}"), "invalid grouping: nothing to build");

        let err = LayoutError::unknown_column("dose");
        assert_eq!(format!("{err}"), "unknown column: dose");
    }

    #[test]
    fn test_model_error_conversion() {
        let model = ModelError::NamingConflict {
            name: "t".to_string(),
        };
        let err: LayoutError = model.into();
        assert!(matches!(err, LayoutError::Model(ModelError::NamingConflict { .. })));
        assert_eq!(format!("{err}"), "table 't' already exists");
    }
}
