//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "tabprof",
    version,
    about = "Stage tabular data in SQLite and infer column types",
    long_about = "Load a delimited file or an existing SQLite table into an all-TEXT \
                  staging table, infer a type for every column from a random sample, \
                  and write a typed copy alongside it."
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

    /// Log output format.
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
    /// Profile a delimited text file.
    Dsv(DsvArgs),

    /// Profile a table in an existing SQLite database.
    Table(TableArgs),
}

#[derive(Parser)]
pub struct DsvArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Field separator; may be several characters.
    #[arg(short = 'd', long = "delimiter", default_value = ",")]
    pub delimiter: String,

    /// Quote character around fields.
    #[arg(long = "bookend", default_value_t = '"', conflicts_with = "no_bookend")]
    pub bookend: char,

    /// Treat quote characters as ordinary text.
    #[arg(long = "no-bookend")]
    pub no_bookend: bool,

    /// Keep whitespace around unquoted fields.
    #[arg(long = "no-strip")]
    pub no_strip: bool,

    /// Keep whitespace inside quoted fields.
    #[arg(long = "no-bookend-strip")]
    pub no_bookend_strip: bool,

    #[arg(long = "encoding", default_value = "utf-8")]
    pub encoding: String,

    /// Rows to skip before the header.
    #[arg(long = "skip-header-rows", default_value_t = 0, allow_negative_numbers = true)]
    pub skip_header_rows: i64,

    /// Rows to drop from the end of the file.
    #[arg(long = "skip-footer-rows", default_value_t = 0, allow_negative_numbers = true)]
    pub skip_footer_rows: i64,

    /// Rows that together form the column names.
    #[arg(long = "header-rows", default_value_t = 1)]
    pub header_rows: usize,

    /// Load rows whose fields are all blank.
    #[arg(long = "keep-empty-rows")]
    pub keep_empty_rows: bool,

    /// Drop fields beyond the header width instead of failing.
    #[arg(long = "truncate-long-rows")]
    pub truncate_long_rows: bool,

    #[command(flatten)]
    pub profile: ProfileArgs,
}

#[derive(Parser)]
pub struct TableArgs {
    /// Database path or `sqlite:///path` URL.
    #[arg(long = "db", value_name = "TARGET")]
    pub db: String,

    /// Attached schema name (defaults to `main`).
    #[arg(long = "schema")]
    pub schema: Option<String>,

    #[arg(long = "table")]
    pub table: String,

    #[command(flatten)]
    pub profile: ProfileArgs,
}

#[derive(Args)]
pub struct ProfileArgs {
    /// Directory for the staging database.
    #[arg(long = "lake-dir", value_name = "DIR", default_value = "lake")]
    pub lake_dir: PathBuf,

    /// Name of the staging table (defaults to the source name).
    #[arg(long = "table-name")]
    pub table_name: Option<String>,

    /// Rows to sample (defaults to the adaptive policy).
    #[arg(long = "sample-size")]
    pub sample_size: Option<usize>,

    /// Rows per insert transaction.
    #[arg(long = "batch-size", default_value_t = tabprof_lake::DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Seed for reproducible sampling.
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Profile only; skip writing the typed table.
    #[arg(long = "no-inferred-table")]
    pub no_inferred_table: bool,

    #[arg(long = "output", value_enum, default_value = "table")]
    pub output: OutputArg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    Table,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum LogFormatArg {
    #[default]
    Pretty,
    Compact,
    Json,
}
