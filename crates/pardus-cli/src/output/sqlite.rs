//! SQLite load script formatter
//!
//! Emits a script for the `sqlite3` shell: DDL and all inserts wrapped
//! in a single transaction, type affinities instead of SQL types, a
//! composite `PRIMARY KEY` clause over the table's key fields, booleans
//! as `1`/`0`.

use std::io::Write;

use pardus_core::value::Value;

use crate::error::Result;
use crate::pipeline::{ExportContext, ExportRow};

use super::effective_value;
use super::formatter::Formatter;
use super::sql::{quote_literal, SqlTypeMap};

/// SQLite load script formatter.
pub struct SqliteFormatter {
    types: SqlTypeMap,
}

impl SqliteFormatter {
    /// Create a new SQLite formatter.
    pub fn new() -> Self {
        Self {
            types: SqlTypeMap::sqlite(),
        }
    }
}

impl Default for SqliteFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for SqliteFormatter {
    fn write_preamble(&mut self, writer: &mut dyn Write, ctx: &ExportContext) -> Result<()> {
        let table = &ctx.config.table_name;

        writeln!(writer, "BEGIN TRANSACTION;")?;
        writeln!(writer, "CREATE TABLE {} (", table)?;

        let mut lines: Vec<String> = ctx
            .selected_fields()
            .map(|f| format!("  {} {}", f.name, self.types.sql_type(f.type_tag, f.len)))
            .collect();
        if ctx.config.mark_deleted {
            lines.push("  deleted INTEGER".to_string());
        }
        let key_fields: Vec<&str> = ctx
            .selected
            .iter()
            .filter(|&&idx| idx < ctx.meta.primary_key_fields)
            .map(|&idx| ctx.schema.fields()[idx].name.as_str())
            .collect();
        if !key_fields.is_empty() {
            lines.push(format!("  PRIMARY KEY ({})", key_fields.join(", ")));
        }
        writeln!(writer, "{}", lines.join(",\n"))?;
        writeln!(writer, ");")?;
        Ok(())
    }

    fn write_row(
        &mut self,
        writer: &mut dyn Write,
        ctx: &ExportContext,
        row: &ExportRow,
    ) -> Result<()> {
        let mut columns: Vec<String> =
            ctx.selected_fields().map(|f| f.name.clone()).collect();
        let mut cells: Vec<String> = ctx
            .selected_fields()
            .zip(&row.values)
            .map(|(field, value)| sqlite_cell(effective_value(value, field, &ctx.config)))
            .collect();
        if ctx.config.mark_deleted {
            columns.push("deleted".to_string());
            cells.push(if row.deleted { "1" } else { "0" }.to_string());
        }
        writeln!(
            writer,
            "INSERT INTO {} ({}) VALUES ({});",
            ctx.config.table_name,
            columns.join(", "),
            cells.join(", ")
        )?;
        Ok(())
    }

    fn write_footer(&mut self, writer: &mut dyn Write, _ctx: &ExportContext) -> Result<()> {
        writeln!(writer, "COMMIT;")?;
        Ok(())
    }
}

fn sqlite_cell(value: &Value) -> String {
    match value {
        Value::Absent => "NULL".to_string(),
        Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Text(s) => quote_literal(s),
        Value::Blob(_) => "NULL".to_string(),
    }
}
