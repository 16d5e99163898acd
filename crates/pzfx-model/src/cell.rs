//! Numeric cell values with an explicit missing marker.

use serde::{Deserialize, Serialize};

/// One data cell of a subcolumn.
///
/// Missing cells are `NoValue`, which is distinct from a stored zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Cell {
    Number(f64),
    #[default]
    NoValue,
}

impl Cell {
    /// Build a cell from an optional number. Non-finite numbers become `NoValue`.
    #[must_use]
    pub fn from_option(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Self::Number(v),
            _ => Self::NoValue,
        }
    }

    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::NoValue => None,
        }
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::NoValue)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::from_option(Some(value))
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        Self::from_option(value)
    }
}
