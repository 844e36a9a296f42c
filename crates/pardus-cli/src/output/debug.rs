//! Diagnostic dump formatter
//!
//! Per record: a placement line (block, neighbors, slot) followed by
//! `name: <hex bytes>` for every selected field, rendered straight from
//! the raw record span.

use std::io::Write;

use crate::error::Result;
use crate::pipeline::{ExportContext, ExportRow};

use super::formatter::Formatter;

/// Raw hex dump formatter.
pub struct DebugFormatter;

impl DebugFormatter {
    /// Create a new debug formatter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for DebugFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for DebugFormatter {
    fn write_preamble(&mut self, _writer: &mut dyn Write, _ctx: &ExportContext) -> Result<()> {
        Ok(())
    }

    fn write_row(
        &mut self,
        writer: &mut dyn Write,
        ctx: &ExportContext,
        row: &ExportRow,
    ) -> Result<()> {
        let suffix = if row.deleted { " (deleted)" } else { "" };
        match &row.placement {
            Some(p) => writeln!(
                writer,
                "record {}: block {} (prev {}, next {}), slot {}{}",
                row.ordinal, p.block, p.prev_block, p.next_block, p.slot, suffix
            )?,
            None => writeln!(writer, "record {}{}", row.ordinal, suffix)?,
        }
        for &idx in &ctx.selected {
            let field = &ctx.schema.fields()[idx];
            match ctx.schema.field_bytes(&row.raw, idx) {
                Some(span) => writeln!(writer, "  {}: {}", field.name, hex_pairs(span))?,
                None => writeln!(writer, "  {}: <truncated>", field.name)?,
            }
        }
        Ok(())
    }

    fn write_footer(&mut self, _writer: &mut dyn Write, _ctx: &ExportContext) -> Result<()> {
        Ok(())
    }
}

fn hex_pairs(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
