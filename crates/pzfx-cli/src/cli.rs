//! CLI argument definitions for the `pzfx` converter.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "pzfx",
    version,
    about = "Convert flat tables to GraphPad Prism .pzfx files and back",
    long_about = "Convert flat CSV tables to GraphPad Prism .pzfx files and back.\n\n\
                  Rows are grouped into Y columns, subcolumns and row labels by the\n\
                  values of categorical columns or by lists of numeric columns."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build one table from a CSV file and write it to a .pzfx file.
    Build(BuildArgs),

    /// List the tables of a .pzfx file.
    Tables(TablesArgs),

    /// Print the flattened records of one table.
    Show(ShowArgs),
}

#[derive(Parser)]
pub struct BuildArgs {
    /// Input CSV file (.tsv and .tab are read tab-delimited) or workbook
    /// (.xlsx, .xlsm, .xlsb, .xls, .ods).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Workbook sheet to read (default: the first sheet).
    #[arg(long = "sheet", value_name = "NAME")]
    pub sheet: Option<String>,

    /// Output .pzfx file.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: PathBuf,

    /// Table name (default: the input file name without extension).
    #[arg(long = "table", value_name = "NAME")]
    pub table: Option<String>,

    /// Grouping stored as JSON; the flags below override its fields.
    #[arg(long = "spec", value_name = "FILE")]
    pub spec: Option<PathBuf>,

    /// One Y column per distinct value of this column.
    #[arg(long = "main-group", value_name = "COL")]
    pub main_group: Option<String>,

    /// One subcolumn per distinct value of this column.
    #[arg(long = "sub-group", value_name = "COL", conflicts_with = "sub_group_data")]
    pub sub_group: Option<String>,

    /// One subcolumn per listed numeric column.
    #[arg(long = "sub-group-data", value_name = "COLS", value_delimiter = ',')]
    pub sub_group_data: Vec<String>,

    /// One row per distinct value of this column.
    #[arg(long = "row-group", value_name = "COL", conflicts_with = "row_group_data")]
    pub row_group: Option<String>,

    /// One row per listed numeric column.
    #[arg(long = "row-group-data", value_name = "COLS", value_delimiter = ',')]
    pub row_group_data: Vec<String>,

    /// Columns supplying the cell values.
    #[arg(long = "data", value_name = "COLS", value_delimiter = ',')]
    pub data: Vec<String>,

    /// Add the table to an existing output file instead of replacing the file.
    #[arg(long = "append")]
    pub append: bool,

    /// Replace a table of the same name when appending.
    #[arg(long = "overwrite")]
    pub overwrite: bool,

    /// Fail on non-numeric data cells and malformed existing output.
    #[arg(long = "strict")]
    pub strict: bool,

    /// Write every value with this many decimals.
    #[arg(long = "decimals", value_name = "N", value_parser = clap::value_parser!(u8).range(0..=15))]
    pub decimals: Option<u8>,

    /// Build and preview the table without writing the output file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct TablesArgs {
    /// Input .pzfx file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Input .pzfx file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Table name.
    #[arg(value_name = "TABLE")]
    pub table: String,

    /// Print at most this many records.
    #[arg(long = "limit", value_name = "N")]
    pub limit: Option<usize>,

    /// Print records as JSON lines.
    #[arg(long = "json")]
    pub json: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
