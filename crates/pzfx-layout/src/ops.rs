//! Document-level entry points.

use pzfx_model::{Document, FlatRecord, ModelError, SourceTable};
use tracing::info;

use crate::build::layout_table;
use crate::error::{LayoutWarning, Result};
use crate::flatten::flatten_table;
use crate::spec::{GroupingSpec, LayoutOptions};

/// Build a table from `source` and store it in `document` under `name`.
///
/// The document is only touched once the whole table has been laid out, so a
/// failed build leaves it unchanged. Returns the coercion and skipped-record
/// warnings collected along the way.
pub fn build_table(
    document: &mut Document,
    name: &str,
    source: &SourceTable,
    spec: &GroupingSpec,
    overwrite: bool,
) -> Result<Vec<LayoutWarning>> {
    build_table_with_options(
        document,
        name,
        source,
        spec,
        overwrite,
        &LayoutOptions::default(),
    )
}

/// [`build_table`] with explicit [`LayoutOptions`].
pub fn build_table_with_options(
    document: &mut Document,
    name: &str,
    source: &SourceTable,
    spec: &GroupingSpec,
    overwrite: bool,
    options: &LayoutOptions,
) -> Result<Vec<LayoutWarning>> {
    if !overwrite && document.contains(name) {
        return Err(ModelError::NamingConflict {
            name: name.to_string(),
        }
        .into());
    }
    let layout = layout_table(name, source, spec, options)?;
    let rows = layout.table.row_count();
    let columns = layout.table.y_columns.len();
    let replaced = document.insert(layout.table, overwrite)?.is_some();
    info!(
        table = name,
        rows,
        y_columns = columns,
        replaced,
        warnings = layout.warnings.len(),
        "built table"
    );
    Ok(layout.warnings)
}

/// Flatten the named table of `document`.
pub fn table_to_rows(document: &Document, name: &str) -> Result<Vec<FlatRecord>> {
    let table = document.table(name)?;
    Ok(flatten_table(table))
}
