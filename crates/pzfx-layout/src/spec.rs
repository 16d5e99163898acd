//! Grouping configuration and its validation against a source table.

use std::collections::BTreeSet;

use pzfx_model::SourceTable;
use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// How a flat table is split into Y columns, subcolumns and rows.
///
/// Each axis has two strategies: group by the values of a categorical
/// column, or use a list of numeric columns directly. At most one strategy
/// may be set per axis. Blank names and empty lists count as unset.
///
/// The serialized form uses camelCase keys, so a grouping stored as JSON reads
/// `{"mainGroupColumn": "grp", "dataColumns": ["val"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupingSpec {
    /// One Y column per distinct value.
    pub main_group_column: Option<String>,
    /// One subcolumn per distinct value.
    pub sub_group_column: Option<String>,
    /// One subcolumn per listed column.
    pub sub_group_data_columns: Vec<String>,
    /// One row label per distinct value.
    pub row_group_column: Option<String>,
    /// One row per listed column.
    pub row_group_data_columns: Vec<String>,
    /// Columns supplying cell values when no axis uses data columns.
    pub data_columns: Vec<String>,
}

impl GroupingSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_main_group(mut self, column: impl Into<String>) -> Self {
        self.main_group_column = Some(column.into());
        self
    }

    #[must_use]
    pub fn with_sub_group(mut self, column: impl Into<String>) -> Self {
        self.sub_group_column = Some(column.into());
        self
    }

    #[must_use]
    pub fn with_sub_group_data<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sub_group_data_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_row_group(mut self, column: impl Into<String>) -> Self {
        self.row_group_column = Some(column.into());
        self
    }

    #[must_use]
    pub fn with_row_group_data<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.row_group_data_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_data_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Check the specification against a source without building anything.
    pub fn validate(&self, source: &SourceTable) -> Result<()> {
        self.resolve(source).map(|_| ())
    }

    pub(crate) fn resolve(&self, source: &SourceTable) -> Result<Plan> {
        let main = non_blank(self.main_group_column.as_deref());
        let sub_column = non_blank(self.sub_group_column.as_deref());
        let sub_data = non_blank_list(&self.sub_group_data_columns);
        let row_column = non_blank(self.row_group_column.as_deref());
        let row_data = non_blank_list(&self.row_group_data_columns);
        let data = non_blank_list(&self.data_columns);

        if sub_column.is_some() && !sub_data.is_empty() {
            return Err(LayoutError::configuration(
                "sub-groups: set either a grouping column or data columns, not both",
            ));
        }
        if row_column.is_some() && !row_data.is_empty() {
            return Err(LayoutError::configuration(
                "row groups: set either a grouping column or data columns, not both",
            ));
        }

        let sub_by_data = !sub_data.is_empty();
        let row_by_data = !row_data.is_empty();
        if data.is_empty() && !sub_by_data && !row_by_data {
            return Err(LayoutError::configuration(
                "nothing to build: select at least one data column",
            ));
        }
        if !data.is_empty() && (sub_by_data || row_by_data) {
            return Err(LayoutError::configuration(
                "data columns cannot be combined with sub-groups or row groups by data columns",
            ));
        }
        if sub_by_data && row_by_data {
            return Err(LayoutError::configuration(
                "sub-groups and row groups cannot both use data columns",
            ));
        }
        if main.is_some() && sub_column.is_some() && data.len() > 1 {
            return Err(LayoutError::configuration(
                "a sub-group column with a main group takes exactly one data column",
            ));
        }

        let sub = match (sub_column, sub_by_data) {
            (Some(name), _) => Axis::ByColumn(lookup(source, name)?),
            (None, true) => Axis::ByDataColumns(lookup_all(source, &sub_data)?),
            (None, false) => Axis::None,
        };
        let row = match (row_column, row_by_data) {
            (Some(name), _) => Axis::ByColumn(lookup(source, name)?),
            (None, true) => Axis::ByDataColumns(lookup_all(source, &row_data)?),
            (None, false) => Axis::None,
        };
        Ok(Plan {
            main: main.map(|name| lookup(source, name)).transpose()?,
            sub,
            row,
            data: lookup_all(source, &data)?,
        })
    }
}

/// Options that change how values are read, not how they are grouped.
#[derive(Debug, Clone, Default)]
pub struct LayoutOptions {
    /// Fail on non-numeric data cells instead of storing no value.
    pub strict: bool,
}

impl LayoutOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable strict numeric coercion.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}

/// Resolved strategy for one axis, holding source column indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Axis {
    None,
    ByColumn(usize),
    ByDataColumns(Vec<usize>),
}

impl Axis {
    pub(crate) fn is_set(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub(crate) fn grouping_column(&self) -> Option<usize> {
        match self {
            Self::ByColumn(idx) => Some(*idx),
            _ => None,
        }
    }
}

/// A validated specification.
#[derive(Debug, Clone)]
pub(crate) struct Plan {
    pub main: Option<usize>,
    pub sub: Axis,
    pub row: Axis,
    pub data: Vec<usize>,
}

impl Plan {
    /// Categorical grouping columns in main, sub, row order.
    pub(crate) fn grouping_columns(&self) -> Vec<usize> {
        [
            self.main,
            self.sub.grouping_column(),
            self.row.grouping_column(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn non_blank_list(values: &[String]) -> Vec<&str> {
    values
        .iter()
        .map(String::as_str).map(str::trim)
        .filter(|v| !v.is_empty())
        .collect()
}

fn lookup(source: &SourceTable, name: &str) -> Result<usize> {
    source
        .column_index(name)
        .ok_or_else(|| LayoutError::unknown_column(name))
}

fn lookup_all(source: &SourceTable, names: &[&str]) -> Result<Vec<usize>> {
    let mut seen = BTreeSet::new();
    let mut indices = Vec::with_capacity(names.len());
    for name in names {
        if !seen.insert(*name) {
            return Err(LayoutError::configuration(format!(
                "column '{name}' is listed twice"
            )));
        }
        indices.push(lookup(source, name)?);
    }
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use pzfx_model::SourceColumn;

    use super::*;

    fn source() -> SourceTable {
        SourceTable::new(vec![
            SourceColumn::categorical("grp", vec![Some("A".into()), Some("B".into())]),
            SourceColumn::categorical("sub", vec![Some("x".into()), Some("y".into())]),
            SourceColumn::numeric("v1", vec![Some(1.0), Some(2.0)]),
            SourceColumn::numeric("v2", vec![Some(3.0), Some(4.0)]),
        ])
        .unwrap()
    }

    fn config_error(spec: &GroupingSpec) -> bool {
        matches!(
            spec.validate(&source()),
            Err(LayoutError::Configuration { .. })
        )
    }

    #[test]
    fn empty_spec_is_nothing_to_build() {
        assert!(config_error(&GroupingSpec::new()));
        assert!(config_error(&GroupingSpec::new().with_main_group("grp")));
    }

    #[test]
    fn both_sub_strategies_are_rejected() {
        let spec = GroupingSpec::new()
            .with_sub_group("sub")
            .with_sub_group_data(["v1", "v2"]);
        assert!(config_error(&spec));
    }

    #[test]
    fn both_row_strategies_are_rejected() {
        let spec = GroupingSpec::new()
            .with_row_group("sub")
            .with_row_group_data(["v1"]);
        assert!(config_error(&spec));
    }

    #[test]
    fn data_columns_conflict_with_data_axes() {
        let spec = GroupingSpec::new()
            .with_data_columns(["v1"])
            .with_sub_group_data(["v2"]);
        assert!(config_error(&spec));

        let spec = GroupingSpec::new()
            .with_sub_group_data(["v1"])
            .with_row_group_data(["v2"]);
        assert!(config_error(&spec));
    }

    #[test]
    fn sub_group_column_with_main_needs_one_data_column() {
        let spec = GroupingSpec::new()
            .with_main_group("grp")
            .with_sub_group("sub")
            .with_data_columns(["v1", "v2"]);
        assert!(config_error(&spec));
    }

    #[test]
    fn unknown_and_repeated_columns() {
        let spec = GroupingSpec::new().with_data_columns(["missing"]);
        assert!(matches!(
            spec.validate(&source()),
            Err(LayoutError::UnknownColumn { ref column }) if column == "missing"
        ));
        assert!(config_error(&GroupingSpec::new().with_data_columns(["v1", "v1"])));
    }

    #[test]
    fn blank_entries_count_as_unset() {
        let spec = GroupingSpec {
            main_group_column: Some("  ".to_string()),
            sub_group_column: Some(String::new()),
            data_columns: vec!["v1".to_string(), String::new()],
            ..GroupingSpec::default()
        };
        let plan = spec.resolve(&source()).unwrap();
        assert_eq!(plan.main, None);
        assert_eq!(plan.sub, Axis::None);
        assert_eq!(plan.data, vec![2]);
    }

    #[test]
    fn deserializes_camel_case() {
        let spec: GroupingSpec = serde_json::from_str(
            r#"{"mainGroupColumn": "grp", "subGroupDataColumns": ["v1", "v2"]}"#,
        )
        .unwrap();
        assert_eq!(spec.main_group_column.as_deref(), Some("grp"));
        assert_eq!(spec.sub_group_data_columns, vec!["v1", "v2"]);
        assert!(spec.data_columns.is_empty());
        let plan = spec.resolve(&source()).unwrap();
        assert_eq!(plan.sub, Axis::ByDataColumns(vec![2, 3]));
        assert!(plan.sub.is_set());
        assert!(!plan.row.is_set());
    }
}
