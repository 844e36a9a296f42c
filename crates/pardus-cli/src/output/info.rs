//! Schema descriptor formatter
//!
//! Prints the table header metadata and the field list; consumes no
//! records.

use std::io::Write;

use crate::error::Result;
use crate::pipeline::{ExportContext, ExportRow};

use super::formatter::Formatter;

/// Table info formatter.
pub struct InfoFormatter;

impl InfoFormatter {
    /// Create a new info formatter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for InfoFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for InfoFormatter {
    fn write_preamble(&mut self, writer: &mut dyn Write, ctx: &ExportContext) -> Result<()> {
        let meta = &ctx.meta;
        writeln!(
            writer,
            "File version:        {}.{}",
            meta.file_version / 10,
            meta.file_version % 10
        )?;
        writeln!(writer, "File type:           {}", meta.file_type_name())?;
        writeln!(writer, "Table name:          {}", meta.table_name)?;
        writeln!(writer, "Num. of records:     {}", ctx.record_count)?;
        writeln!(
            writer,
            "Theoretical records: {}",
            ctx.theoretical_record_count
        )?;
        writeln!(writer, "Num. of fields:      {}", ctx.schema.len())?;
        writeln!(
            writer,
            "Num. of key fields:  {}",
            meta.primary_key_fields
        )?;
        writeln!(writer, "Code page:           {}", meta.code_page)?;
        writeln!(
            writer,
            "Write protected:     {}",
            if meta.write_protected { "yes" } else { "no" }
        )?;
        writeln!(writer)?;
        writeln!(writer, "Field name         | Type")?;
        writeln!(writer, "------------------------------------")?;
        for field in ctx.selected_fields() {
            writeln!(
                writer,
                "{:<18} | {}",
                field.name,
                field.type_tag.display_name(field.len)
            )?;
        }
        Ok(())
    }

    fn write_row(
        &mut self,
        _writer: &mut dyn Write,
        _ctx: &ExportContext,
        _row: &ExportRow,
    ) -> Result<()> {
        Ok(())
    }

    fn write_footer(&mut self, _writer: &mut dyn Write, _ctx: &ExportContext) -> Result<()> {
        Ok(())
    }

    fn wants_rows(&self) -> bool {
        false
    }
}
