//! Error types for `.pzfx` reading and writing.

use std::path::PathBuf;

use pzfx_model::ModelError;
use thiserror::Error;

/// Errors that can occur when reading or writing `.pzfx` files.
#[derive(Debug, Error)]
pub enum PzfxError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Structurally invalid document.
    #[error("invalid pzfx file: {message}")]
    InvalidFormat { message: String },

    /// Required child element absent.
    #[error("missing element: <{parent}> has no <{expected}>")]
    MissingElement {
        parent: String,
        expected: &'static str,
    },

    /// Required attribute absent.
    #[error("missing attribute: <{element}> has no {attribute}")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    /// A data cell that is neither empty nor a number.
    #[error("table '{table}': '{value}' is not a number")]
    InvalidNumber { table: String, value: String },

    /// Malformed XML.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The finished temp file could not replace the target.
    #[error("failed to replace {target_path} with {temp_path}: {source}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        source: std::io::Error,
    },

    /// Decoded content violates the document model.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result type alias for `.pzfx` operations.
pub type Result<T> = std::result::Result<T, PzfxError>;

impl PzfxError {
    /// Create an InvalidFormat error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create a MissingElement error.
    pub fn missing_element(parent: impl Into<String>, expected: &'static str) -> Self {
        Self::MissingElement {
            parent: parent.into(),
            expected,
        }
    }

    /// Create a MissingAttribute error.
    pub fn missing_attribute(element: impl Into<String>, attribute: &'static str) -> Self {
        Self::MissingAttribute {
            element: element.into(),
            attribute,
        }
    }

    /// Whether this error describes malformed input rather than I/O.
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat { .. }
                | Self::MissingElement { .. }
                | Self::MissingAttribute { .. }
                | Self::InvalidNumber { .. }
                | Self::Xml(_)
                | Self::Model(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PzfxError::missing_element("GraphPadPrismFile", "TableSequence");
        assert_eq!(
            format!("{err}"),
            "missing element: <GraphPadPrismFile> has no <TableSequence>"
        );

        let err = PzfxError::missing_attribute("Table", "ID");
        assert_eq!(format!("{err}"), "missing attribute: <Table> has no ID");
    }

    #[test]
    fn test_format_classification() {
        assert!(PzfxError::invalid_format("bad root").is_format_error());
        let io = PzfxError::from(std::io::Error::other("disk"));
        assert!(!io.is_format_error());
    }
}
