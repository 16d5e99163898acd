use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use pzfx_cli::types::{BuildResult, TableSummary};
use pzfx_model::{FlatRecord, format_numeric};

pub fn print_build_summary(result: &BuildResult) {
    let summary = &result.table;
    if result.written {
        println!(
            "Wrote {} ({} table{})",
            result.output.display(),
            result.tables_in_document,
            if result.tables_in_document == 1 { "" } else { "s" }
        );
    } else {
        println!("Dry run: {} not written", result.output.display());
    }
    print_tables(std::slice::from_ref(summary));

    if !result.warnings.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![header_cell("Warning")]);
        apply_table_style(&mut table);
        for warning in &result.warnings {
            table.add_row(vec![Cell::new(warning.to_string()).fg(Color::Yellow)]);
        }
        println!("{table}");
    }

    if let Some(preview) = &result.preview {
        print_records(preview, preview.len());
    }
}

pub fn print_tables(tables: &[TableSummary]) {
    if tables.is_empty() {
        println!("No tables.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Kind"),
        header_cell("Rows"),
        header_cell("Y columns"),
        header_cell("Subcolumns"),
        header_cell("Values"),
    ]);
    apply_table_style(&mut table);
    for summary in tables {
        table.add_row(vec![
            Cell::new(&summary.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(summary.kind),
            count_cell(summary.rows),
            count_cell(summary.y_columns),
            count_cell(summary.subcolumns),
            count_cell(summary.values),
        ]);
    }
    for index in 2..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    println!("{table}");
}

/// Print `records`; `total` is the count before any limit was applied.
pub fn print_records(records: &[FlatRecord], total: usize) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Row label"),
        header_cell("Y column"),
        header_cell("Subcolumn"),
        header_cell("Value"),
    ]);
    apply_table_style(&mut table);
    for record in records {
        table.add_row(vec![
            dim_cell(record.row_index),
            Cell::new(&record.row_label),
            Cell::new(&record.y_column),
            Cell::new(&record.subcolumn),
            Cell::new(format_numeric(record.value)),
        ]);
    }
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    println!("{table}");
    if records.len() < total {
        println!("... {} of {total} records shown", records.len());
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
