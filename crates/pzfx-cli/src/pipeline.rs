//! File-level steps behind the `pzfx` commands.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use pzfx_ingest::read_source_table_from_sheet;
use pzfx_layout::{GroupingSpec, LayoutOptions, build_table_with_options, table_to_rows};
use pzfx_model::{Document, FlatRecord};
use pzfx_xml::{ReaderOptions, WriterOptions, load_with_options, save_with_options};
use tracing::{debug, info, info_span};

use crate::types::{BuildRequest, BuildResult, TableSummary};

/// Table name used when the input path has no usable file stem.
pub const DEFAULT_TABLE_NAME: &str = "Data 1";

/// Read a grouping stored as JSON.
pub fn load_grouping_file(path: &Path) -> Result<GroupingSpec> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read grouping file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse grouping file {}", path.display()))
}

/// Overlay the fields set in `overrides` onto `base`.
///
/// Setting one strategy of an axis clears the other one inherited from `base`.
pub fn merge_grouping(base: GroupingSpec, overrides: &GroupingSpec) -> GroupingSpec {
    let mut merged = base;
    if overrides.main_group_column.is_some() {
        merged.main_group_column.clone_from(&overrides.main_group_column);
    }
    if overrides.sub_group_column.is_some() {
        merged.sub_group_column.clone_from(&overrides.sub_group_column);
        merged.sub_group_data_columns.clear();
    }
    if !overrides.sub_group_data_columns.is_empty() {
        merged.sub_group_data_columns.clone_from(&overrides.sub_group_data_columns);
        merged.sub_group_column = None;
    }
    if overrides.row_group_column.is_some() {
        merged.row_group_column.clone_from(&overrides.row_group_column);
        merged.row_group_data_columns.clear();
    }
    if !overrides.row_group_data_columns.is_empty() {
        merged.row_group_data_columns.clone_from(&overrides.row_group_data_columns);
        merged.row_group_column = None;
    }
    if !overrides.data_columns.is_empty() {
        merged.data_columns.clone_from(&overrides.data_columns);
    }
    merged
}

/// Table name derived from the input file name.
pub fn default_table_name(input: &Path) -> String {
    input
        .file_stem()
        .and_then(std::ffi::OsStr::to_str)
        .map(str::trim)
        .filter(|stem| !stem.is_empty())
        .map_or_else(|| DEFAULT_TABLE_NAME.to_string(), str::to_string)
}

/// Load `path` if it exists, otherwise start an empty document.
pub fn open_or_create(path: &Path, strict: bool) -> Result<Document> {
    if !path.exists() {
        debug!(path = %path.display(), "output does not exist yet; starting empty document");
        return Ok(Document::new());
    }
    let options = if strict {
        ReaderOptions::new().strict()
    } else {
        ReaderOptions::new()
    };
    load_with_options(path, &options).with_context(|| format!("load {}", path.display()))
}

pub fn run_build(request: &BuildRequest) -> Result<BuildResult> {
    let span = info_span!("build", table = %request.table);
    let _guard = span.enter();

    let source = read_source_table_from_sheet(&request.input, request.sheet.as_deref())
        .with_context(|| format!("read {}", request.input.display()))?;
    info!(
        input = %request.input.display(),
        columns = source.columns().len(),
        rows = source.row_count(),
        "loaded source table"
    );

    let mut document = if request.append {
        open_or_create(&request.output, request.strict)?
    } else {
        Document::new()
    };

    let options = if request.strict {
        LayoutOptions::new().strict()
    } else {
        LayoutOptions::new()
    };
    let warnings = build_table_with_options(
        &mut document,
        &request.table,
        &source,
        &request.grouping,
        request.overwrite,
        &options,
    )
    .with_context(|| format!("build table '{}'", request.table))?;

    let table = document
        .get(&request.table)
        .map(TableSummary::from_table)
        .ok_or_else(|| anyhow!("table '{}' missing after build", request.table))?;

    let preview = if request.dry_run {
        Some(table_to_rows(&document, &request.table)?)
    } else {
        let mut writer_options = WriterOptions::new().created_now();
        if let Some(decimals) = request.decimals {
            writer_options = writer_options.with_decimals(decimals);
        }
        save_with_options(&document, &request.output, &writer_options)
            .with_context(|| format!("write {}", request.output.display()))?;
        None
    };

    Ok(BuildResult {
        output: request.output.clone(),
        table,
        tables_in_document: document.len(),
        warnings,
        written: !request.dry_run,
        preview,
    })
}

/// Shapes of every table in the file, in document order.
pub fn list_tables(path: &Path) -> Result<Vec<TableSummary>> {
    let document = load_with_options(path, &ReaderOptions::new())
        .with_context(|| format!("load {}", path.display()))?;
    Ok(document.tables().iter().map(TableSummary::from_table).collect())
}

/// Flattened records of one table.
pub fn table_records(path: &Path, table: &str) -> Result<Vec<FlatRecord>> {
    let document = load_with_options(path, &ReaderOptions::new())
        .with_context(|| format!("load {}", path.display()))?;
    table_to_rows(&document, table).with_context(|| format!("read table '{table}'"))
}
