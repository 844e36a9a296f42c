//! Formatter trait and factory function
//!
//! Defines the common interface for all output formatters. A formatter
//! is stateless across rows apart from first-column separator handling;
//! preamble and footer bracket the row stream.

use std::io::Write;

use crate::cli::SqlMode;
use crate::error::Result;
use crate::pipeline::{ExportContext, ExportRow};

use super::csv::CsvFormatter;
use super::debug::DebugFormatter;
use super::html::HtmlFormatter;
use super::info::InfoFormatter;
use super::sql::{SqlFormatter, SqlTypeMap};
use super::sqlite::SqliteFormatter;

/// Trait for output formatters.
pub trait Formatter {
    /// Write everything that precedes the rows: CSV header, DDL,
    /// table opening tags, or the whole info block.
    fn write_preamble(&mut self, writer: &mut dyn Write, ctx: &ExportContext) -> Result<()>;

    /// Write a single row.
    fn write_row(
        &mut self,
        writer: &mut dyn Write,
        ctx: &ExportContext,
        row: &ExportRow,
    ) -> Result<()>;

    /// Write everything that follows the rows: COPY terminator,
    /// transaction commit, closing tags.
    fn write_footer(&mut self, writer: &mut dyn Write, ctx: &ExportContext) -> Result<()>;

    /// False for formats that only consume the schema (info).
    fn wants_rows(&self) -> bool {
        true
    }
}

/// The output format selected for a run, with its per-format settings.
pub enum OutputFormat {
    /// Table header metadata and field list
    Info,
    /// Delimited text
    Csv,
    /// SQL DDL + DML
    Sql {
        /// DML dialect
        mode: SqlMode,
        /// Type map built at startup, including user overrides
        types: SqlTypeMap,
    },
    /// SQLite load script
    Sqlite,
    /// HTML table
    Html,
    /// Raw hex dump with placement
    Debug,
}

/// Create a formatter for the specified output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Info => Box::new(InfoFormatter::new()),
        OutputFormat::Csv => Box::new(CsvFormatter::new()),
        OutputFormat::Sql { mode, types } => Box::new(SqlFormatter::new(mode, types)),
        OutputFormat::Sqlite => Box::new(SqliteFormatter::new()),
        OutputFormat::Html => Box::new(HtmlFormatter::new()),
        OutputFormat::Debug => Box::new(DebugFormatter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_formatter_wants_no_rows() {
        let formatter = create_formatter(OutputFormat::Info);
        assert!(!formatter.wants_rows());
    }

    #[test]
    fn test_row_formats_want_rows() {
        for format in [
            OutputFormat::Csv,
            OutputFormat::Sql {
                mode: SqlMode::Copy,
                types: SqlTypeMap::postgres(),
            },
            OutputFormat::Sqlite,
            OutputFormat::Html,
            OutputFormat::Debug,
        ] {
            assert!(create_formatter(format).wants_rows());
        }
    }
}
