//! CLI parser - command-line argument parsing with clap
//!
//! One subcommand per output format; the shared export options are
//! flattened argument groups.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Pardus - export Paradox table files
#[derive(Parser, Debug)]
#[command(name = "pardus")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Write output to FILE instead of stdout
    #[arg(long, short = 'o', global = true, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable verbose diagnostics (includes debug-level logging)
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands, one per output format
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show table header information and the field list
    Info(InfoCommand),
    /// Dump records as delimited text
    Csv(CsvCommand),
    /// Dump records as SQL DDL and DML
    Sql(SqlCommand),
    /// Dump records as an SQLite load script
    Sqlite(SqliteCommand),
    /// Dump records as an HTML table
    Html(HtmlCommand),
    /// Dump raw record bytes with block placement
    Debug(DebugCommand),
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum, value_name = "SHELL")]
        shell: Shell,
    },
}

/// Input file arguments shared by every format.
#[derive(Args, Debug)]
pub struct InputArgs {
    /// The Paradox table file to read
    pub file: PathBuf,

    /// Read blob payloads from this blob file
    #[arg(long, short = 'b', value_name = "FILE")]
    pub blob_file: Option<PathBuf>,
}

/// Export options shared by the record-dumping formats.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Only export fields whose name matches this pattern
    /// (extended regex, case-insensitive)
    #[arg(long, value_name = "PATTERN")]
    pub fields: Option<String>,

    /// Prefix for files created from blob payloads
    #[arg(long, short = 'p', value_name = "PREFIX")]
    pub blob_prefix: Option<String>,

    /// Do not resolve blob fields at all
    #[arg(long)]
    pub skip_blobs: bool,

    /// Include soft-deleted records in the output
    #[arg(long)]
    pub include_deleted: bool,

    /// Append a trailing boolean column flagging deleted records
    #[arg(long)]
    pub mark_deleted: bool,

    /// Treat empty character values as NULL
    #[arg(long)]
    pub empty_string_null: bool,

    /// Table name to use instead of the one in the file header
    #[arg(long, value_name = "NAME")]
    pub table: Option<String>,
}

/// `info` subcommand
#[derive(Args, Debug)]
pub struct InfoCommand {
    #[command(flatten)]
    pub input: InputArgs,
}

/// `csv` subcommand
#[derive(Args, Debug)]
pub struct CsvCommand {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub export: ExportArgs,

    /// Field separator character
    #[arg(long, short = 'd', default_value = ";", value_parser = clap::value_parser!(char))]
    pub delimiter: char,

    /// Enclosure character for values containing the separator
    #[arg(long, short = 'e', default_value = "\"", value_parser = clap::value_parser!(char))]
    pub enclosure: char,

    /// Emit a header line of `name,code,length` cells
    #[arg(long)]
    pub with_header: bool,
}

/// SQL DML dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum SqlMode {
    /// `COPY ... FROM stdin;` bulk form (default)
    #[default]
    Copy,
    /// One `insert into ...` statement per record
    Insert,
}

/// `sql` subcommand
#[derive(Args, Debug)]
pub struct SqlCommand {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub export: ExportArgs,

    /// DML dialect to emit
    #[arg(long, value_enum, default_value = "copy")]
    pub mode: SqlMode,

    /// Override the SQL type for a field type, as CODE=TEMPLATE
    /// (e.g. `A=varchar({len})`); may be repeated
    #[arg(long = "sql-type", value_name = "SPEC")]
    pub sql_type: Vec<String>,
}

/// `sqlite` subcommand
#[derive(Args, Debug)]
pub struct SqliteCommand {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub export: ExportArgs,
}

/// `html` subcommand
#[derive(Args, Debug)]
pub struct HtmlCommand {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub export: ExportArgs,
}

/// `debug` subcommand
#[derive(Args, Debug)]
pub struct DebugCommand {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub export: ExportArgs,
}
