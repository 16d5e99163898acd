//! Forward layout: flat source rows to a grouped Prism table.
//!
//! ```text
//! source rows ──► usable rows (blank grouping keys dropped)
//!            ──► Y slices × sub slices × row slices
//!            ──► matching records per cell, repeated labels for depth > 1
//!            ──► Table
//! ```
//!
//! Every axis is a list of [`Slice`]s. A slice optionally filters records by
//! a grouping key and optionally names the source column that supplies the
//! cell value. Validation guarantees exactly one of the three axes supplies
//! the value column for any cell.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Range;

use pzfx_model::{
    Cell, ColumnData, SourceColumn, SourceTable, Subcolumn, Table, TableKind, YColumn, parse_f64,
};
use tracing::{debug, warn};

use crate::error::{LayoutError, LayoutWarning, Result};
use crate::spec::{Axis, GroupingSpec, LayoutOptions, Plan};

/// A built table plus the warnings collected while building it.
#[derive(Debug, Clone)]
pub struct Layout {
    pub table: Table,
    pub warnings: Vec<LayoutWarning>,
}

/// Lay out `source` as a table named `name`.
///
/// This is a pure function: it touches no document and returns either a
/// complete, rectangular table or an error.
pub fn layout_table(
    name: &str,
    source: &SourceTable,
    spec: &GroupingSpec,
    options: &LayoutOptions,
) -> Result<Layout> {
    if name.trim().is_empty() {
        return Err(LayoutError::configuration("table name must not be empty"));
    }
    let plan = spec.resolve(source)?;
    let mut warnings = Vec::new();
    let keys = GroupKeys::collect(source, &plan, &mut warnings);

    let y_slices = y_slices(source, &plan, &keys);
    let sub_slices = sub_slices(source, &plan, &keys);
    let row_slices = row_slices(source, &plan, &keys);
    if y_slices.is_empty() || sub_slices.is_empty() {
        return Err(LayoutError::configuration(format!(
            "no rows left to group for table '{name}'"
        )));
    }

    // records[y][s][r]: source rows landing in that cell, in source order.
    let mut records: Vec<Vec<Vec<Vec<usize>>>> =
        vec![vec![vec![Vec::new(); row_slices.len()]; sub_slices.len()]; y_slices.len()];
    let y_index = AxisIndex::new(&y_slices);
    let s_index = AxisIndex::new(&sub_slices);
    let r_index = AxisIndex::new(&row_slices);
    for &row in &keys.rows {
        for y in y_index.positions(&keys, row) {
            for s in s_index.positions(&keys, row) {
                for r in r_index.positions(&keys, row) {
                    records[y][s][r].push(row);
                }
            }
        }
    }

    let depths: Vec<usize> = (0..row_slices.len())
        .map(|r| {
            records
                .iter()
                .flat_map(|per_sub| per_sub.iter().map(|per_row| per_row[r].len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut table = Table::new(name, table_kind(&plan));
    for (slice, depth) in row_slices.iter().zip(&depths) {
        table
            .row_labels
            .extend(std::iter::repeat_n(slice.title.clone(), *depth));
    }

    for (y_idx, y) in y_slices.iter().enumerate() {
        let mut subcolumns = Vec::with_capacity(sub_slices.len());
        for (s_idx, s) in sub_slices.iter().enumerate() {
            let mut values = Vec::with_capacity(table.row_labels.len());
            for (r_idx, r) in row_slices.iter().enumerate() {
                let column = y
                    .value
                    .or(s.value)
                    .or(r.value)
                    .map(|idx| source.column_at(idx))
                    .ok_or_else(|| LayoutError::configuration("no data column supplies values"))?;
                let matches = &records[y_idx][s_idx][r_idx];
                for k in 0..depths[r_idx] {
                    let cell = match matches.get(k) {
                        Some(&row) => extract(column, row, options, &mut warnings)?,
                        None => Cell::NoValue,
                    };
                    values.push(cell);
                }
            }
            subcolumns.push(Subcolumn::new(s.title.clone(), values));
        }
        table.y_columns.push(YColumn::new(y.title.clone(), subcolumns));
    }

    table.validate()?;
    debug!(
        table = %table.name,
        kind = %table.kind,
        y_columns = table.y_columns.len(),
        subcolumns = table.subcolumn_count(),
        rows = table.row_count(),
        warnings = warnings.len(),
        "laid out table"
    );
    Ok(Layout { table, warnings })
}

fn table_kind(plan: &Plan) -> TableKind {
    let data_as_subcolumns = plan.main.is_some() && plan.data.len() > 1;
    if plan.sub.is_set() || data_as_subcolumns {
        TableKind::GroupedBySubcolumns
    } else if plan.main.is_some() || plan.row.is_set() {
        TableKind::GroupedByColumn
    } else {
        TableKind::Simple
    }
}

/// Grouping keys of the usable rows.
struct GroupKeys {
    /// Rows with every grouping key present, in source order.
    rows: Vec<usize>,
    /// Rendered keys per grouping column index.
    by_column: BTreeMap<usize, Vec<Option<String>>>,
}

impl GroupKeys {
    fn collect(source: &SourceTable, plan: &Plan, warnings: &mut Vec<LayoutWarning>) -> Self {
        let grouping = plan.grouping_columns();
        let by_column: BTreeMap<usize, Vec<Option<String>>> = grouping
            .iter()
            .map(|&idx| {
                let column = source.column_at(idx);
                (idx, (0..source.row_count()).map(|row| column.key(row)).collect())
            })
            .collect();

        let mut rows = Vec::with_capacity(source.row_count());
        'rows: for row in 0..source.row_count() {
            for &idx in &grouping {
                if by_column[&idx][row].is_none() {
                    let column = source.column_at(idx).name.clone();
                    warn!(column = %column, row, "skipping record with blank grouping key");
                    warnings.push(LayoutWarning::MissingGroupKey { column, row });
                    continue 'rows;
                }
            }
            rows.push(row);
        }
        Self { rows, by_column }
    }

    fn key(&self, column: usize, row: usize) -> Option<&str> {
        self.by_column
            .get(&column)
            .and_then(|keys| keys[row].as_deref())
    }

    /// Distinct keys of a grouping column over the usable rows, first seen first.
    fn distinct(&self, column: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        for &row in &self.rows {
            if let Some(key) = self.key(column, row)
                && seen.insert(key)
            {
                ordered.push(key.to_string());
            }
        }
        ordered
    }
}

/// One position along an axis.
#[derive(Debug, Clone)]
struct Slice {
    title: String,
    filter: Option<(usize, String)>,
    value: Option<usize>,
}

impl Slice {
    fn untitled() -> Self {
        Self {
            title: String::new(),
            filter: None,
            value: None,
        }
    }

    fn group(column: usize, key: String) -> Self {
        Self {
            title: key.clone(),
            filter: Some((column, key)),
            value: None,
        }
    }

    fn data(source: &SourceTable, column: usize) -> Self {
        Self {
            title: source.column_at(column).name.clone(),
            filter: None,
            value: Some(column),
        }
    }
}

/// Maps a record to the slices it falls into along one axis.
///
/// Slices of an axis either all filter on the same grouping column or none
/// filters at all, in which case every record lands in every slice.
struct AxisIndex<'a> {
    column: Option<usize>,
    by_key: HashMap<&'a str, usize>,
    len: usize,
}

impl<'a> AxisIndex<'a> {
    fn new(slices: &'a [Slice]) -> Self {
        let mut column = None;
        let mut by_key = HashMap::with_capacity(slices.len());
        for (idx, slice) in slices.iter().enumerate() {
            if let Some((filter_column, key)) = &slice.filter {
                column = Some(*filter_column);
                by_key.insert(key.as_str(), idx);
            }
        }
        Self {
            column,
            by_key,
            len: slices.len(),
        }
    }

    fn positions(&self, keys: &GroupKeys, row: usize) -> Range<usize> {
        let Some(column) = self.column else {
            return 0..self.len;
        };
        match keys.key(column, row).and_then(|key| self.by_key.get(key)) {
            Some(&idx) => idx..idx + 1,
            None => 0..0,
        }
    }
}

fn group_slices(keys: &GroupKeys, column: usize) -> Vec<Slice> {
    keys.distinct(column)
        .into_iter()
        .map(|key| Slice::group(column, key))
        .collect()
}

fn data_slices(source: &SourceTable, columns: &[usize]) -> Vec<Slice> {
    columns.iter().map(|&idx| Slice::data(source, idx)).collect()
}

fn y_slices(source: &SourceTable, plan: &Plan, keys: &GroupKeys) -> Vec<Slice> {
    match plan.main {
        Some(main) => {
            let value = match plan.data.as_slice() {
                [single] => Some(*single),
                _ => None,
            };
            group_slices(keys, main)
                .into_iter()
                .map(|slice| Slice { value, ..slice })
                .collect()
        }
        None if !plan.data.is_empty() => data_slices(source, &plan.data),
        None => vec![Slice::untitled()],
    }
}

fn sub_slices(source: &SourceTable, plan: &Plan, keys: &GroupKeys) -> Vec<Slice> {
    match &plan.sub {
        Axis::ByColumn(column) => group_slices(keys, *column),
        Axis::ByDataColumns(columns) => data_slices(source, columns),
        Axis::None if plan.main.is_some() && plan.data.len() > 1 => {
            data_slices(source, &plan.data)
        }
        Axis::None => vec![Slice::untitled()],
    }
}

fn row_slices(source: &SourceTable, plan: &Plan, keys: &GroupKeys) -> Vec<Slice> {
    match &plan.row {
        Axis::ByColumn(column) => group_slices(keys, *column),
        Axis::ByDataColumns(columns) => data_slices(source, columns),
        Axis::None => vec![Slice::untitled()],
    }
}

/// Read one data cell, coercing text to a number.
fn extract(
    column: &SourceColumn,
    row: usize,
    options: &LayoutOptions,
    warnings: &mut Vec<LayoutWarning>,
) -> Result<Cell> {
    match &column.data {
        ColumnData::Numeric(values) => match values[row] {
            Some(value) if !value.is_finite() => {
                reject(column, row, &value.to_string(), options, warnings)
            }
            value => Ok(Cell::from_option(value)),
        },
        ColumnData::Categorical(values) => {
            let Some(raw) = values[row].as_deref() else {
                return Ok(Cell::NoValue);
            };
            match parse_f64(raw) {
                Some(number) => Ok(Cell::Number(number)),
                None => reject(column, row, raw, options, warnings),
            }
        }
    }
}

/// A value that is not a finite number: an error when strict, otherwise no value.
fn reject(
    column: &SourceColumn,
    row: usize,
    raw: &str,
    options: &LayoutOptions,
    warnings: &mut Vec<LayoutWarning>,
) -> Result<Cell> {
    if options.strict {
        return Err(LayoutError::NotNumeric {
            column: column.name.clone(),
            row,
            raw: raw.to_string(),
        });
    }
    warn!(column = %column.name, row, raw, "non-numeric cell stored as no value");
    warnings.push(LayoutWarning::ValueCoercion {
        column: column.name.clone(),
        row,
        raw: raw.to_string(),
    });
    Ok(Cell::NoValue)
}

#[cfg(test)]
mod tests {
    use pzfx_model::SourceColumn;

    use super::*;

    fn text(values: &[&str]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|v| (!v.is_empty()).then(|| (*v).to_string()))
            .collect()
    }

    #[test]
    fn kind_follows_grouping() {
        let source = SourceTable::new(vec![
            SourceColumn::categorical("g", text(&["a"])),
            SourceColumn::numeric("v", vec![Some(1.0)]),
            SourceColumn::numeric("w", vec![Some(2.0)]),
        ])
        .unwrap();
        let kind = |spec: GroupingSpec| {
            layout_table("t", &source, &spec, &LayoutOptions::default())
                .unwrap()
                .table
                .kind
        };
        assert_eq!(kind(GroupingSpec::new().with_data_columns(["v"])), TableKind::Simple);
        assert_eq!(
            kind(GroupingSpec::new().with_main_group("g").with_data_columns(["v"])),
            TableKind::GroupedByColumn
        );
        assert_eq!(
            kind(GroupingSpec::new().with_main_group("g").with_data_columns(["v", "w"])),
            TableKind::GroupedBySubcolumns
        );
        assert_eq!(
            kind(GroupingSpec::new().with_row_group("g").with_data_columns(["v"])),
            TableKind::GroupedByColumn
        );
    }

    #[test]
    fn distinct_keeps_first_seen_order() {
        let source = SourceTable::new(vec![SourceColumn::categorical(
            "g",
            text(&["b", "a", "b", "c", "a"]),
        )])
        .unwrap();
        let plan = Plan {
            main: Some(0),
            sub: Axis::None,
            row: Axis::None,
            data: Vec::new(),
        };
        let mut warnings = Vec::new();
        let keys = GroupKeys::collect(&source, &plan, &mut warnings);
        assert_eq!(keys.distinct(0), vec!["b", "a", "c"]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn blank_keys_are_reported() {
        let source = SourceTable::new(vec![
            SourceColumn::categorical("g", text(&["a", "", "b"])),
            SourceColumn::numeric("v", vec![Some(1.0), Some(2.0), Some(3.0)]),
        ])
        .unwrap();
        let spec = GroupingSpec::new().with_main_group("g").with_data_columns(["v"]);
        let layout = layout_table("t", &source, &spec, &LayoutOptions::default()).unwrap();
        assert_eq!(
            layout.warnings,
            vec![LayoutWarning::MissingGroupKey {
                column: "g".to_string(),
                row: 1
            }]
        );
        assert_eq!(layout.table.y_columns.len(), 2);
        assert_eq!(layout.table.row_count(), 1);
    }

    #[test]
    fn coercion_warns_or_fails_in_strict_mode() {
        let source = SourceTable::new(vec![SourceColumn::categorical(
            "v",
            text(&["1", "n/a", ""]),
        )])
        .unwrap();
        let spec = GroupingSpec::new().with_data_columns(["v"]);

        let layout = layout_table("t", &source, &spec, &LayoutOptions::default()).unwrap();
        let values = &layout.table.y_columns[0].subcolumns[0].values;
        assert_eq!(values, &vec![Cell::Number(1.0), Cell::NoValue, Cell::NoValue]);
        assert_eq!(layout.warnings.len(), 1);
        assert!(matches!(
            &layout.warnings[0],
            LayoutWarning::ValueCoercion { row: 1, raw, .. } if raw == "n/a"
        ));

        let err = layout_table("t", &source, &spec, &LayoutOptions::new().strict()).unwrap_err();
        assert!(matches!(err, LayoutError::NotNumeric { row: 1, .. }));
    }

    #[test]
    fn non_finite_numbers_are_coerced_like_text() {
        let source = SourceTable::new(vec![SourceColumn::numeric(
            "v",
            vec![Some(f64::NAN), Some(1.0), Some(f64::INFINITY), None],
        )])
        .unwrap();
        let spec = GroupingSpec::new().with_data_columns(["v"]);

        let layout = layout_table("t", &source, &spec, &LayoutOptions::default()).unwrap();
        let values = &layout.table.y_columns[0].subcolumns[0].values;
        assert_eq!(
            values,
            &vec![Cell::NoValue, Cell::Number(1.0), Cell::NoValue, Cell::NoValue]
        );
        let rows: Vec<usize> = layout
            .warnings
            .iter()
            .map(|warning| match warning {
                LayoutWarning::ValueCoercion { row, .. }
                | LayoutWarning::MissingGroupKey { row, .. } => *row,
            })
            .collect();
        assert_eq!(rows, vec![0, 2]);

        let err = layout_table("t", &source, &spec, &LayoutOptions::new().strict()).unwrap_err();
        assert!(matches!(err, LayoutError::NotNumeric { row: 0, .. }));
    }

    #[test]
    fn unique_row_keys_each_get_one_row() {
        let n = 5_000;
        let source = SourceTable::new(vec![
            SourceColumn::categorical("id", (0..n).map(|i| Some(format!("s{i}"))).collect()),
            SourceColumn::categorical(
                "arm",
                (0..n).map(|i| Some(if i % 2 == 0 { "a" } else { "b" }.to_string())).collect(),
            ),
            SourceColumn::numeric("v", (0..n).map(|i| Some(i as f64)).collect()),
        ])
        .unwrap();
        let spec = GroupingSpec::new()
            .with_main_group("arm")
            .with_row_group("id")
            .with_data_columns(["v"]);

        let layout = layout_table("t", &source, &spec, &LayoutOptions::default()).unwrap();
        assert_eq!(layout.table.row_count(), n);
        assert_eq!(layout.table.y_columns.len(), 2);
        assert_eq!(layout.table.y_columns[0].subcolumns[0].values[0], Cell::Number(0.0));
        assert_eq!(layout.table.y_columns[0].subcolumns[0].values[1], Cell::NoValue);
        assert_eq!(layout.table.y_columns[1].subcolumns[0].values[1], Cell::Number(1.0));
        let last = n - 1;
        assert_eq!(
            layout.table.y_columns[1].subcolumns[0].values[last],
            Cell::Number(last as f64)
        );
    }

    #[test]
    fn blank_table_name_is_rejected() {
        let source =
            SourceTable::new(vec![SourceColumn::numeric("v", vec![Some(1.0)])]).unwrap();
        let spec = GroupingSpec::new().with_data_columns(["v"]);
        assert!(matches!(
            layout_table(" ", &source, &spec, &LayoutOptions::default()),
            Err(LayoutError::Configuration { .. })
        ));
    }

    #[test]
    fn main_group_without_rows_is_an_error() {
        let source = SourceTable::new(vec![
            SourceColumn::categorical("g", Vec::new()),
            SourceColumn::numeric("v", Vec::new()),
        ])
        .unwrap();
        let spec = GroupingSpec::new().with_main_group("g").with_data_columns(["v"]);
        assert!(matches!(
            layout_table("t", &source, &spec, &LayoutOptions::default()),
            Err(LayoutError::Configuration { .. })
        ));
    }
}
