use std::io::Write;

use anyhow::{Context, Result};
use pzfx_cli::pipeline::{
    default_table_name, list_tables, load_grouping_file, merge_grouping, run_build as build,
    table_records,
};
use pzfx_cli::types::{BuildRequest, BuildResult};
use pzfx_layout::GroupingSpec;
use tracing::info_span;

use crate::cli::{BuildArgs, ShowArgs, TablesArgs};
use crate::summary::{print_records, print_tables};

pub fn run_build(args: &BuildArgs) -> Result<BuildResult> {
    let base = match &args.spec {
        Some(path) => load_grouping_file(path)?,
        None => GroupingSpec::default(),
    };
    let request = BuildRequest {
        input: args.input.clone(),
        sheet: args.sheet.clone(),
        output: args.output.clone(),
        table: args
            .table
            .clone()
            .unwrap_or_else(|| default_table_name(&args.input)),
        grouping: merge_grouping(base, &grouping_from_flags(args)),
        append: args.append,
        overwrite: args.overwrite,
        strict: args.strict,
        decimals: args.decimals.map(usize::from),
        dry_run: args.dry_run,
    };
    build(&request)
}

fn grouping_from_flags(args: &BuildArgs) -> GroupingSpec {
    GroupingSpec {
        main_group_column: args.main_group.clone(),
        sub_group_column: args.sub_group.clone(),
        sub_group_data_columns: args.sub_group_data.clone(),
        row_group_column: args.row_group.clone(),
        row_group_data_columns: args.row_group_data.clone(),
        data_columns: args.data.clone(),
    }
}

pub fn run_tables(args: &TablesArgs) -> Result<()> {
    let span = info_span!("tables", file = %args.file.display());
    let _guard = span.enter();
    let tables = list_tables(&args.file)?;
    print_tables(&tables);
    Ok(())
}

pub fn run_show(args: &ShowArgs) -> Result<()> {
    let span = info_span!("show", table = %args.table);
    let _guard = span.enter();
    let records = table_records(&args.file, &args.table)?;
    let shown = args.limit.unwrap_or(records.len()).min(records.len());
    if args.json {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for record in &records[..shown] {
            serde_json::to_writer(&mut out, record).context("encode record")?;
            writeln!(out).context("write record")?;
        }
    } else {
        print_records(&records[..shown], records.len());
    }
    Ok(())
}
