//! Delimited text formatter
//!
//! One line per record with a configurable separator and enclosure.
//! The optional header line encodes `name,code,length` per field, using
//! the one-character type codes. Absent values render as empty cells.

use std::io::Write;

use crate::error::Result;
use crate::pipeline::{ExportContext, ExportRow};

use super::formatter::Formatter;
use super::{display_value, effective_value};

/// Delimited text formatter.
pub struct CsvFormatter;

impl CsvFormatter {
    /// Create a new CSV formatter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for CsvFormatter {
    fn write_preamble(&mut self, writer: &mut dyn Write, ctx: &ExportContext) -> Result<()> {
        if !ctx.config.with_header {
            return Ok(());
        }
        let mut cells: Vec<String> = ctx
            .selected_fields()
            .map(|f| {
                escape_delimited(
                    &format!("{},{},{}", f.name, f.type_tag.code(), f.len),
                    ctx.config.delimiter,
                    ctx.config.enclosure,
                )
            })
            .collect();
        if ctx.config.mark_deleted {
            cells.push(escape_delimited(
                "deleted,L,1",
                ctx.config.delimiter,
                ctx.config.enclosure,
            ));
        }
        writeln!(writer, "{}", cells.join(&ctx.config.delimiter.to_string()))?;
        Ok(())
    }

    fn write_row(
        &mut self,
        writer: &mut dyn Write,
        ctx: &ExportContext,
        row: &ExportRow,
    ) -> Result<()> {
        let mut cells: Vec<String> = ctx
            .selected_fields()
            .zip(&row.values)
            .map(|(field, value)| {
                match display_value(effective_value(value, field, &ctx.config)) {
                    None => String::new(),
                    Some(text) => {
                        escape_delimited(&text, ctx.config.delimiter, ctx.config.enclosure)
                    }
                }
            })
            .collect();
        if ctx.config.mark_deleted {
            cells.push(if row.deleted { "1" } else { "0" }.to_string());
        }
        writeln!(writer, "{}", cells.join(&ctx.config.delimiter.to_string()))?;
        Ok(())
    }

    fn write_footer(&mut self, _writer: &mut dyn Write, _ctx: &ExportContext) -> Result<()> {
        Ok(())
    }
}

/// Escape one cell: wrap in the enclosure when the text contains the
/// separator, the enclosure or a line break, doubling any embedded
/// enclosure characters.
fn escape_delimited(s: &str, delimiter: char, enclosure: char) -> String {
    if s.contains(delimiter) || s.contains(enclosure) || s.contains('\n') || s.contains('\r') {
        let mut doubled = String::with_capacity(s.len() + 2);
        doubled.push(enclosure);
        for c in s.chars() {
            if c == enclosure {
                doubled.push(enclosure);
            }
            doubled.push(c);
        }
        doubled.push(enclosure);
        doubled
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputConfig;
    use pardus_core::schema::{FieldDescriptor, Schema, TypeTag};
    use pardus_core::value::Value;
    use pardus_core::{FieldSelection, MemoryStore};

    fn context(config: OutputConfig) -> ExportContext {
        let schema = Schema::new(vec![
            FieldDescriptor::new("qty", TypeTag::Short, 2),
            FieldDescriptor::new("name", TypeTag::Alpha, 10),
        ]);
        let store = MemoryStore::new("stock", schema);
        ExportContext::new(&store, &FieldSelection::all(), config)
    }

    fn row(values: Vec<Value>) -> ExportRow {
        ExportRow {
            ordinal: 0,
            deleted: false,
            placement: None,
            values,
            raw: Vec::new(),
        }
    }

    fn render(ctx: &ExportContext, rows: &[ExportRow]) -> String {
        let mut formatter = CsvFormatter::new();
        let mut out = Vec::new();
        formatter.write_preamble(&mut out, ctx).unwrap();
        for r in rows {
            formatter.write_row(&mut out, ctx, r).unwrap();
        }
        formatter.write_footer(&mut out, ctx).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_basic_row() {
        let ctx = context(OutputConfig::default());
        let out = render(&ctx, &[row(vec![Value::Int(5), Value::Text("ab".into())])]);
        assert_eq!(out, "5;ab\n");
    }

    #[test]
    fn test_header_cells_encode_name_code_length() {
        let ctx = context(OutputConfig::default().with_header(true));
        let out = render(&ctx, &[]);
        assert_eq!(out, "qty,S,2;name,A,10\n");
    }

    #[test]
    fn test_header_cells_are_escaped_under_comma_separator() {
        let ctx = context(
            OutputConfig::default()
                .with_separators(',', '"')
                .with_header(true),
        );
        let out = render(&ctx, &[]);
        assert_eq!(out, "\"qty,S,2\",\"name,A,10\"\n");
    }

    #[test]
    fn test_absent_renders_empty_cell() {
        let ctx = context(OutputConfig::default());
        let out = render(&ctx, &[row(vec![Value::Absent, Value::Text("x".into())])]);
        assert_eq!(out, ";x\n");
    }

    #[test]
    fn test_value_with_delimiter_is_wrapped() {
        let ctx = context(OutputConfig::default());
        let out = render(
            &ctx,
            &[row(vec![Value::Int(1), Value::Text("a;b".into())])],
        );
        assert_eq!(out, "1;\"a;b\"\n");
    }

    #[test]
    fn test_embedded_enclosure_is_doubled() {
        let ctx = context(OutputConfig::default());
        let out = render(
            &ctx,
            &[row(vec![Value::Int(1), Value::Text("say \"hi\"".into())])],
        );
        assert_eq!(out, "1;\"say \"\"hi\"\"\"\n");
    }

    #[test]
    fn test_quote_without_delimiter_stays_unwrapped() {
        // O'Brien contains neither the separator nor the enclosure
        let ctx = context(OutputConfig::default());
        let out = render(
            &ctx,
            &[row(vec![Value::Int(1), Value::Text("O'Brien".into())])],
        );
        assert_eq!(out, "1;O'Brien\n");
    }

    #[test]
    fn test_empty_string_null_promotes_alpha() {
        let config = OutputConfig {
            empty_string_is_null: true,
            ..OutputConfig::default()
        };
        let ctx = context(config);
        let out = render(&ctx, &[row(vec![Value::Int(1), Value::Text(String::new())])]);
        assert_eq!(out, "1;\n");
    }

    #[test]
    fn test_mark_deleted_appends_boolean_column() {
        let config = OutputConfig {
            mark_deleted: true,
            output_deleted: true,
            with_header: true,
            ..OutputConfig::default()
        };
        let ctx = context(config);
        let mut deleted_row = row(vec![Value::Int(2), Value::Text("gone".into())]);
        deleted_row.deleted = true;
        let live_row = row(vec![Value::Int(1), Value::Text("here".into())]);
        let out = render(&ctx, &[live_row, deleted_row]);
        assert_eq!(
            out,
            "qty,S,2;name,A,10;deleted,L,1\n1;here;0\n2;gone;1\n"
        );
    }

    #[test]
    fn test_boolean_cells() {
        let ctx = context(OutputConfig::default());
        let out = render(&ctx, &[row(vec![Value::Bool(true), Value::Bool(false)])]);
        assert_eq!(out, "1;0\n");
    }
}
