#![deny(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::error::{ModelError, Result};

/// How replicates are organised inside a table.
///
/// The Prism XML layout differs between a plain column table and the grouped
/// forms, so the kind travels with the table through encode and decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// Column table: no row labels, one value per subcolumn row.
    #[default]
    Simple,
    /// Grouped table with one subcolumn per Y column.
    GroupedByColumn,
    /// Grouped table whose Y columns carry titled subcolumns (replicates).
    GroupedBySubcolumns,
}

impl TableKind {
    #[must_use]
    pub fn is_grouped(self) -> bool {
        !matches!(self, Self::Simple)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::GroupedByColumn => "grouped-by-column",
            Self::GroupedBySubcolumns => "grouped-by-subcolumns",
        }
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcolumn {
    pub title: String,
    pub values: Vec<Cell>,
}

impl Subcolumn {
    pub fn new(title: impl Into<String>, values: Vec<Cell>) -> Self {
        Self {
            title: title.into(),
            values,
        }
    }

    /// Number of cells holding a value.
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.values.iter().filter(|cell| !cell.is_missing()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YColumn {
    pub title: String,
    pub subcolumns: Vec<Subcolumn>,
}

impl YColumn {
    pub fn new(title: impl Into<String>, subcolumns: Vec<Subcolumn>) -> Self {
        Self {
            title: title.into(),
            subcolumns,
        }
    }
}

/// One named Prism data table.
///
/// `row_labels` holds exactly one entry per data row; unlabeled rows use the
/// empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub kind: TableKind,
    pub row_labels: Vec<String>,
    pub y_columns: Vec<YColumn>,
}

impl Table {
    pub fn new(name: impl Into<String>, kind: TableKind) -> Self {
        Self {
            name: name.into(),
            kind,
            row_labels: Vec::new(),
            y_columns: Vec::new(),
        }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_labels.len()
    }

    /// Subcolumns per Y column (zero for a table without columns).
    #[must_use]
    pub fn subcolumn_count(&self) -> usize {
        self.y_columns
            .first()
            .map_or(0, |column| column.subcolumns.len())
    }

    #[must_use]
    pub fn has_row_labels(&self) -> bool {
        self.row_labels.iter().any(|label| !label.is_empty())
    }

    /// Check the rectangular shape every table must keep.
    ///
    /// Only `GroupedBySubcolumns` tables may carry several or titled
    /// subcolumns; the other kinds have exactly one untitled subcolumn.
    pub fn validate(&self) -> Result<()> {
        if self.y_columns.is_empty() {
            return Err(self.ragged("table has no Y columns"));
        }
        let subcolumns = self.subcolumn_count();
        if subcolumns == 0 {
            return Err(self.ragged("Y columns have no subcolumns"));
        }
        let rows = self.row_count();
        for column in &self.y_columns {
            if column.subcolumns.len() != subcolumns {
                return Err(self.ragged(format!(
                    "Y column '{}' has {} subcolumns, expected {subcolumns}",
                    column.title,
                    column.subcolumns.len()
                )));
            }
            for sub in &column.subcolumns {
                if sub.values.len() != rows {
                    return Err(self.ragged(format!(
                        "subcolumn '{}' of '{}' has {} cells, expected {rows}",
                        sub.title,
                        column.title,
                        sub.values.len()
                    )));
                }
            }
        }
        if self.kind != TableKind::GroupedBySubcolumns {
            if subcolumns > 1 {
                return Err(self.kind_mismatch(format!(
                    "{subcolumns} subcolumns per Y column, expected 1"
                )));
            }
            if let Some(sub) = self
                .y_columns
                .iter()
                .flat_map(|column| &column.subcolumns)
                .find(|sub| !sub.title.is_empty())
            {
                return Err(self.kind_mismatch(format!("subcolumn titled '{}'", sub.title)));
            }
        }
        Ok(())
    }

    fn kind_mismatch(&self, message: impl Into<String>) -> ModelError {
        ModelError::KindMismatch {
            table: self.name.clone(),
            kind: self.kind,
            message: message.into(),
        }
    }

    fn ragged(&self, message: impl Into<String>) -> ModelError {
        ModelError::RaggedTable {
            table: self.name.clone(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new("t", TableKind::GroupedByColumn);
        table.row_labels = vec!["r1".to_string(), "r2".to_string()];
        table.y_columns = vec![
            YColumn::new("A", vec![Subcolumn::new("", vec![Cell::from(1.0), Cell::NoValue])]),
            YColumn::new("B", vec![Subcolumn::new("", vec![Cell::from(2.0), Cell::from(3.0)])]),
        ];
        table
    }

    #[test]
    fn rectangular_table_validates() {
        let table = sample();
        assert!(table.validate().is_ok());
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.subcolumn_count(), 1);
        assert!(table.has_row_labels());
    }

    #[test]
    fn short_subcolumn_is_rejected() {
        let mut table = sample();
        table.y_columns[1].subcolumns[0].values.pop();
        let err = table.validate().unwrap_err();
        assert!(matches!(err, ModelError::RaggedTable { .. }));
    }

    #[test]
    fn uneven_subcolumn_counts_are_rejected() {
        let mut table = sample();
        table.y_columns[0]
            .subcolumns
            .push(Subcolumn::new("extra", vec![Cell::NoValue, Cell::NoValue]));
        assert!(table.validate().is_err());
    }

    #[test]
    fn only_subcolumn_tables_carry_replicates() {
        let mut titled = sample();
        titled.y_columns[0].subcolumns[0].title = "x".to_string();
        assert!(matches!(
            titled.validate(),
            Err(ModelError::KindMismatch { kind: TableKind::GroupedByColumn, .. })
        ));
        titled.kind = TableKind::GroupedBySubcolumns;
        assert!(titled.validate().is_ok());

        let mut simple = Table::new("s", TableKind::Simple);
        simple.row_labels = vec![String::new()];
        simple.y_columns = vec![YColumn::new(
            "v",
            vec![
                Subcolumn::new("", vec![Cell::from(1.0)]),
                Subcolumn::new("", vec![Cell::from(2.0)]),
            ],
        )];
        assert!(matches!(simple.validate(), Err(ModelError::KindMismatch { .. })));
    }

    #[test]
    fn empty_table_is_rejected() {
        let table = Table::new("empty", TableKind::Simple);
        assert!(table.validate().is_err());
    }
}
