//! SQL formatter
//!
//! Emits `CREATE TABLE` DDL, one `CREATE INDEX` per primary-key field,
//! then records either as a `COPY ... FROM stdin;` block terminated by
//! `\.` or as one `insert into` statement per record. Text literals are
//! single-quoted with embedded quotes doubled; COPY cells use backslash
//! escapes and `\N` nulls.

use std::collections::HashMap;
use std::io::Write;

use pardus_core::schema::TypeTag;
use pardus_core::value::Value;

use crate::cli::SqlMode;
use crate::error::Result;
use crate::pipeline::{ExportContext, ExportRow};

use super::effective_value;
use super::formatter::Formatter;

/// Immutable map from field type to SQL column type template.
///
/// Built once at startup (defaults plus user overrides) and handed to
/// the formatter; templates may contain `{len}` for the byte length.
#[derive(Debug, Clone)]
pub struct SqlTypeMap {
    map: HashMap<TypeTag, String>,
}

impl SqlTypeMap {
    /// Default PostgreSQL-flavored column types.
    pub fn postgres() -> Self {
        let map = [
            (TypeTag::Alpha, "char({len})"),
            (TypeTag::Date, "date"),
            (TypeTag::Short, "smallint"),
            (TypeTag::Long, "integer"),
            (TypeTag::Currency, "numeric(20,2)"),
            (TypeTag::Number, "double precision"),
            (TypeTag::Logical, "boolean"),
            (TypeTag::MemoBlob, "text"),
            (TypeTag::Blob, "text"),
            (TypeTag::FormattedMemoBlob, "text"),
            (TypeTag::Ole, "text"),
            (TypeTag::Graphic, "text"),
            (TypeTag::Time, "time"),
            (TypeTag::Timestamp, "timestamp"),
            (TypeTag::AutoIncrement, "integer"),
            (TypeTag::PackedDecimal, "numeric"),
            (TypeTag::RawBytes, "bytea"),
        ];
        Self {
            map: map.iter().map(|(t, s)| (*t, s.to_string())).collect(),
        }
    }

    /// SQLite type affinities.
    pub fn sqlite() -> Self {
        let map = [
            (TypeTag::Alpha, "TEXT"),
            (TypeTag::Date, "TEXT"),
            (TypeTag::Short, "INTEGER"),
            (TypeTag::Long, "INTEGER"),
            (TypeTag::Currency, "REAL"),
            (TypeTag::Number, "REAL"),
            (TypeTag::Logical, "INTEGER"),
            (TypeTag::MemoBlob, "TEXT"),
            (TypeTag::Blob, "TEXT"),
            (TypeTag::FormattedMemoBlob, "TEXT"),
            (TypeTag::Ole, "TEXT"),
            (TypeTag::Graphic, "TEXT"),
            (TypeTag::Time, "TEXT"),
            (TypeTag::Timestamp, "INTEGER"),
            (TypeTag::AutoIncrement, "INTEGER"),
            (TypeTag::PackedDecimal, "NUMERIC"),
            (TypeTag::RawBytes, "BLOB"),
        ];
        Self {
            map: map.iter().map(|(t, s)| (*t, s.to_string())).collect(),
        }
    }

    /// Apply user overrides on top of the defaults.
    pub fn with_overrides(mut self, overrides: Vec<(TypeTag, String)>) -> Self {
        for (tag, template) in overrides {
            self.map.insert(tag, template);
        }
        self
    }

    /// The column type for a field, `{len}` substituted.
    pub fn sql_type(&self, tag: TypeTag, len: usize) -> String {
        self.map
            .get(&tag)
            .map(|t| t.replace("{len}", &len.to_string()))
            .unwrap_or_else(|| "text".to_string())
    }
}

/// SQL DDL + DML formatter.
pub struct SqlFormatter {
    mode: SqlMode,
    types: SqlTypeMap,
}

impl SqlFormatter {
    /// Create a formatter for the given dialect with a prepared type map.
    pub fn new(mode: SqlMode, types: SqlTypeMap) -> Self {
        Self { mode, types }
    }

    fn column_list(ctx: &ExportContext) -> Vec<String> {
        let mut cols: Vec<String> = ctx.selected_fields().map(|f| f.name.clone()).collect();
        if ctx.config.mark_deleted {
            cols.push("deleted".to_string());
        }
        cols
    }
}

impl Formatter for SqlFormatter {
    fn write_preamble(&mut self, writer: &mut dyn Write, ctx: &ExportContext) -> Result<()> {
        let table = &ctx.config.table_name;

        writeln!(writer, "CREATE TABLE {} (", table)?;
        let mut lines: Vec<String> = ctx
            .selected
            .iter()
            .map(|&idx| {
                let field = &ctx.schema.fields()[idx];
                let sql_type = self.types.sql_type(field.type_tag, field.len);
                if idx < ctx.meta.primary_key_fields {
                    format!("  {} {} unique", field.name, sql_type)
                } else {
                    format!("  {} {}", field.name, sql_type)
                }
            })
            .collect();
        if ctx.config.mark_deleted {
            lines.push("  deleted boolean".to_string());
        }
        writeln!(writer, "{}", lines.join(",\n"))?;
        writeln!(writer, ");")?;

        for &idx in &ctx.selected {
            if idx < ctx.meta.primary_key_fields {
                let field = &ctx.schema.fields()[idx];
                writeln!(
                    writer,
                    "CREATE INDEX {0}_{1}_index on {0} ({1});",
                    table, field.name
                )?;
            }
        }

        if self.mode == SqlMode::Copy {
            writeln!(
                writer,
                "COPY {} ({}) FROM stdin;",
                table,
                Self::column_list(ctx).join(", ")
            )?;
        }
        Ok(())
    }

    fn write_row(
        &mut self,
        writer: &mut dyn Write,
        ctx: &ExportContext,
        row: &ExportRow,
    ) -> Result<()> {
        match self.mode {
            SqlMode::Copy => {
                let mut cells: Vec<String> = ctx
                    .selected_fields()
                    .zip(&row.values)
                    .map(|(field, value)| {
                        copy_cell(effective_value(value, field, &ctx.config))
                    })
                    .collect();
                if ctx.config.mark_deleted {
                    cells.push(if row.deleted { "t" } else { "f" }.to_string());
                }
                writeln!(writer, "{}", cells.join("\t"))?;
            }
            SqlMode::Insert => {
                let mut cells: Vec<String> = ctx
                    .selected_fields()
                    .zip(&row.values)
                    .map(|(field, value)| {
                        insert_cell(effective_value(value, field, &ctx.config))
                    })
                    .collect();
                if ctx.config.mark_deleted {
                    cells.push(if row.deleted { "true" } else { "false" }.to_string());
                }
                writeln!(
                    writer,
                    "insert into {} ({}) values ({});",
                    ctx.config.table_name,
                    Self::column_list(ctx).join(", "),
                    cells.join(", ")
                )?;
            }
        }
        Ok(())
    }

    fn write_footer(&mut self, writer: &mut dyn Write, _ctx: &ExportContext) -> Result<()> {
        if self.mode == SqlMode::Copy {
            writeln!(writer, "\\.")?;
        }
        Ok(())
    }
}

/// One COPY text-format cell: `\N` for null, backslash escapes for
/// backslash, tab and line breaks.
fn copy_cell(value: &Value) -> String {
    match value {
        Value::Absent => "\\N".to_string(),
        Value::Bool(b) => if *b { "t" } else { "f" }.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Text(s) => {
            let mut out = String::with_capacity(s.len());
            for c in s.chars() {
                match c {
                    '\\' => out.push_str("\\\\"),
                    '\t' => out.push_str("\\t"),
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    _ => out.push(c),
                }
            }
            out
        }
        Value::Blob(_) => "\\N".to_string(),
    }
}

/// One INSERT value: `NULL` for null, single-quoted text with embedded
/// quotes doubled.
fn insert_cell(value: &Value) -> String {
    match value {
        Value::Absent => "NULL".to_string(),
        Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Text(s) => quote_literal(s),
        Value::Blob(_) => "NULL".to_string(),
    }
}

/// Single-quote a text literal, doubling embedded quotes.
pub(crate) fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
