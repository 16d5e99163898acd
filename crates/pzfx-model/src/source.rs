//! Flat, column-typed input data for the layout engine.
//!
//! Each column is classified once, at ingestion, as numeric or categorical.
//! Grouping and value extraction dispatch on that tag instead of inspecting
//! cells again.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::numeric::{format_numeric, is_blank, parse_f64};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

impl ColumnData {
    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Numeric(_) => ColumnKind::Numeric,
            Self::Categorical(_) => ColumnKind::Categorical,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(values) => values.len(),
            Self::Categorical(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceColumn {
    pub name: String,
    pub data: ColumnData,
}

impl SourceColumn {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn categorical(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Categorical(values),
        }
    }

    /// Classify raw text cells.
    ///
    /// The column is numeric when it has at least one non-blank cell and every
    /// non-blank cell parses as a finite number. Blank cells become `None`.
    pub fn infer<S: AsRef<str>>(name: impl Into<String>, raw: &[S]) -> Self {
        let mut non_blank = 0usize;
        let mut numeric = 0usize;
        for cell in raw {
            let cell = cell.as_ref();
            if is_blank(cell) {
                continue;
            }
            non_blank += 1;
            if parse_f64(cell).is_some() {
                numeric += 1;
            }
        }
        if non_blank > 0 && numeric == non_blank {
            let values = raw.iter().map(|cell| parse_f64(cell.as_ref())).collect();
            Self::numeric(name, values)
        } else {
            let values = raw
                .iter()
                .map(|cell| {
                    let trimmed = cell.as_ref().trim();
                    (!trimmed.is_empty()).then(|| trimmed.to_string())
                })
                .collect();
            Self::categorical(name, values)
        }
    }

    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        self.data.kind()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Cell rendered as a grouping key; `None` for blank cells.
    #[must_use]
    pub fn key(&self, row: usize) -> Option<String> {
        match &self.data {
            ColumnData::Numeric(values) => values.get(row).copied().flatten().map(format_numeric),
            ColumnData::Categorical(values) => values.get(row).cloned().flatten(),
        }
    }
}

/// Rectangular input table with uniquely named, equally long columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceTable {
    columns: Vec<SourceColumn>,
    row_count: usize,
}

impl SourceTable {
    pub fn new(columns: Vec<SourceColumn>) -> Result<Self> {
        let row_count = columns.first().map_or(0, SourceColumn::len);
        let mut seen = BTreeSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(ModelError::DuplicateColumn {
                    name: column.name.clone(),
                });
            }
            if column.len() != row_count {
                return Err(ModelError::ColumnLengthMismatch {
                    name: column.name.clone(),
                    expected: row_count,
                    actual: column.len(),
                });
            }
        }
        Ok(Self { columns, row_count })
    }

    /// Build from a header row and text rows, inferring each column's kind.
    ///
    /// Short rows are padded with blanks; extra cells are ignored.
    pub fn from_text_rows(headers: &[String], rows: &[Vec<String>]) -> Result<Self> {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let raw: Vec<&str> = rows
                    .iter()
                    .map(|row| row.get(idx).map_or("", String::as_str))
                    .collect();
                SourceColumn::infer(header.clone(), &raw)
            })
            .collect();
        Self::new(columns)
    }

    #[must_use]
    pub fn columns(&self) -> &[SourceColumn] {
        &self.columns
    }

    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|col| col.name.as_str()).collect()
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&SourceColumn> {
        self.columns.iter().find(|col| col.name == name)
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name == name)
    }

    #[must_use]
    pub fn column_at(&self, idx: usize) -> &SourceColumn {
        &self.columns[idx]
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Names of columns of the given kind, in column order.
    #[must_use]
    pub fn names_of_kind(&self, kind: ColumnKind) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|col| col.kind() == kind)
            .map(|col| col.name.as_str())
            .collect()
    }
}
