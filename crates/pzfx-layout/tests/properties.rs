//! Property tests for the layout engine.

use proptest::prelude::*;
use pzfx_layout::{GroupingSpec, LayoutOptions, build_table, flatten_table, layout_table};
use pzfx_model::{Document, SourceColumn, SourceTable};

#[derive(Debug, Clone)]
struct Record {
    grp: String,
    sub: String,
    row: String,
    val: Option<f64>,
    val2: Option<f64>,
}

fn key() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("a".to_string()),
        Just("b".to_string()),
        Just("c".to_string()),
        Just(String::new()),
    ]
}

fn value() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        1 => Just(None),
        4 => (-1.0e6f64..1.0e6).prop_map(Some),
    ]
}

fn records() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(
        (key(), key(), key(), value(), value()).prop_map(|(grp, sub, row, val, val2)| Record {
            grp,
            sub,
            row,
            val,
            val2,
        }),
        0..30,
    )
}

fn keys(records: &[Record], field: fn(&Record) -> &str) -> Vec<Option<String>> {
    records
        .iter()
        .map(|r| Some(field(r).to_string()).filter(|s| !s.is_empty()))
        .collect()
}

fn source(records: &[Record]) -> SourceTable {
    SourceTable::new(vec![
        SourceColumn::categorical("grp", keys(records, |r| r.grp.as_str())),
        SourceColumn::categorical("sub", keys(records, |r| r.sub.as_str())),
        SourceColumn::categorical("row", keys(records, |r| r.row.as_str())),
        SourceColumn::numeric("val", records.iter().map(|r| r.val).collect()),
        SourceColumn::numeric("val2", records.iter().map(|r| r.val2).collect()),
    ])
    .unwrap()
}

/// Where the numeric columns go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Values {
    /// `val` as the only data column.
    One,
    /// `val` and `val2` as data columns.
    Two,
    /// `val` and `val2` as subcolumns.
    SubData,
    /// `val` and `val2` as rows.
    RowData,
}

#[derive(Debug, Clone, Copy)]
struct Shape {
    main: bool,
    sub: bool,
    row: bool,
    values: Values,
}

impl Shape {
    fn spec(self) -> GroupingSpec {
        let mut spec = match self.values {
            Values::One => GroupingSpec::new().with_data_columns(["val"]),
            Values::Two => GroupingSpec::new().with_data_columns(["val", "val2"]),
            Values::SubData => GroupingSpec::new().with_sub_group_data(["val", "val2"]),
            Values::RowData => GroupingSpec::new().with_row_group_data(["val", "val2"]),
        };
        if self.main {
            spec = spec.with_main_group("grp");
        }
        if self.sub {
            spec = spec.with_sub_group("sub");
        }
        if self.row {
            spec = spec.with_row_group("row");
        }
        spec
    }

    /// (y column, subcolumn, row label) a record's value lands under.
    fn address(self, record: &Record, data: &str) -> (String, String, String) {
        let y = if self.main {
            record.grp.clone()
        } else if matches!(self.values, Values::One | Values::Two) {
            data.to_string()
        } else {
            String::new()
        };
        let sub = if self.sub {
            record.sub.clone()
        } else if self.values == Values::SubData || (self.values == Values::Two && self.main) {
            data.to_string()
        } else {
            String::new()
        };
        let row = if self.row {
            record.row.clone()
        } else if self.values == Values::RowData {
            data.to_string()
        } else {
            String::new()
        };
        (y, sub, row)
    }
}

/// Every combination of the categorical axes with every data-column strategy.
///
/// A categorical axis is left unset when the same axis already takes the
/// numeric columns.
fn shape() -> impl Strategy<Value = Shape> {
    (
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        prop_oneof![
            Just(Values::One),
            Just(Values::Two),
            Just(Values::SubData),
            Just(Values::RowData),
        ],
    )
        .prop_map(|(main, sub, row, values)| Shape {
            main,
            sub: sub && values != Values::SubData,
            row: row && values != Values::RowData,
            values,
        })
}

proptest! {
    #[test]
    fn built_tables_are_rectangular(
        records in records(),
        shape in shape(),
    ) {
        let source = source(&records);
        if let Ok(layout) = layout_table("t", &source, &shape.spec(), &LayoutOptions::default()) {
            prop_assert!(layout.table.validate().is_ok());
            let rows = layout.table.row_count();
            let subs = layout.table.subcolumn_count();
            for column in &layout.table.y_columns {
                prop_assert_eq!(column.subcolumns.len(), subs);
                for subcolumn in &column.subcolumns {
                    prop_assert_eq!(subcolumn.values.len(), rows);
                }
            }
        }
    }

    #[test]
    fn flatten_reports_each_value_exactly_once(
        records in records(),
        shape in shape(),
    ) {
        let source = source(&records);
        let Ok(layout) = layout_table("t", &source, &shape.spec(), &LayoutOptions::default()) else {
            return Ok(());
        };

        // Records that survive grouping, keyed the way the table addresses them.
        let mut expected: Vec<(String, String, String, u64)> = records
            .iter()
            .filter(|r| !(shape.main && r.grp.is_empty()))
            .filter(|r| !(shape.sub && r.sub.is_empty()))
            .filter(|r| !(shape.row && r.row.is_empty()))
            .flat_map(|r| {
                let mut data = vec![("val", r.val)];
                if shape.values != Values::One {
                    data.push(("val2", r.val2));
                }
                data.into_iter().filter_map(move |(name, value)| {
                    let (y, sub, row) = shape.address(r, name);
                    Some((y, sub, row, value?.to_bits()))
                })
            })
            .collect();
        let mut actual: Vec<(String, String, String, u64)> = flatten_table(&layout.table)
            .into_iter()
            .map(|r| (r.y_column, r.subcolumn, r.row_label, r.value.to_bits()))
            .collect();
        expected.sort();
        actual.sort();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn rebuilding_with_overwrite_is_idempotent(
        records in records(),
        shape in shape(),
    ) {
        let source = source(&records);
        let spec = shape.spec();
        let mut doc = Document::new();
        if build_table(&mut doc, "t", &source, &spec, true).is_ok() {
            let first = doc.clone();
            prop_assert!(build_table(&mut doc, "t", &source, &spec, true).is_ok());
            prop_assert_eq!(doc, first);
        }
    }
}
