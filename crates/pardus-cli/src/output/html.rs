//! HTML table formatter
//!
//! A single `<table>` element: one header row of `<th>` cells, one
//! `<tr>` per record. Cell text is written as-is; entity escaping is a
//! known limitation of this format.

use std::io::Write;

use crate::error::Result;
use crate::pipeline::{ExportContext, ExportRow};

use super::formatter::Formatter;
use super::{display_value, effective_value};

/// HTML table formatter.
pub struct HtmlFormatter;

impl HtmlFormatter {
    /// Create a new HTML formatter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for HtmlFormatter {
    fn write_preamble(&mut self, writer: &mut dyn Write, ctx: &ExportContext) -> Result<()> {
        writeln!(writer, "<table>")?;
        write!(writer, "<tr>")?;
        for field in ctx.selected_fields() {
            write!(writer, "<th>{}</th>", field.name)?;
        }
        if ctx.config.mark_deleted {
            write!(writer, "<th>deleted</th>")?;
        }
        writeln!(writer, "</tr>")?;
        Ok(())
    }

    fn write_row(
        &mut self,
        writer: &mut dyn Write,
        ctx: &ExportContext,
        row: &ExportRow,
    ) -> Result<()> {
        write!(writer, "<tr>")?;
        for (field, value) in ctx.selected_fields().zip(&row.values) {
            match display_value(effective_value(value, field, &ctx.config)) {
                None => write!(writer, "<td></td>")?,
                Some(text) => write!(writer, "<td>{}</td>", text)?,
            }
        }
        if ctx.config.mark_deleted {
            write!(writer, "<td>{}</td>", if row.deleted { "1" } else { "0" })?;
        }
        writeln!(writer, "</tr>")?;
        Ok(())
    }

    fn write_footer(&mut self, writer: &mut dyn Write, _ctx: &ExportContext) -> Result<()> {
        writeln!(writer, "</table>")?;
        Ok(())
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
        let mut formatter = HtmlFormatter::new();
        let mut out = Vec::new();
        formatter.write_preamble(&mut out, ctx).unwrap();
        for r in rows {
            formatter.write_row(&mut out, ctx, r).unwrap();
        }
        formatter.write_footer(&mut out, ctx).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_single_table_shape() {
        let ctx = context(OutputConfig::default());
        let out = render(&ctx, &[row(vec![Value::Int(5), Value::Text("ab".into())])]);
        assert_eq!(
            out,
            "<table>\n<tr><th>qty</th><th>name</th></tr>\n\
             <tr><td>5</td><td>ab</td></tr>\n</table>\n"
        );
    }

    #[test]
    fn test_absent_renders_empty_cell() {
        let ctx = context(OutputConfig::default());
        let out = render(&ctx, &[row(vec![Value::Absent, Value::Text("x".into())])]);
        assert!(out.contains("<tr><td></td><td>x</td></tr>"));
    }

    #[test]
    fn test_no_entity_escaping() {
        // Known limitation: markup in values passes through untouched.
        let ctx = context(OutputConfig::default());
        let out = render(&ctx, &[row(vec![Value::Int(1), Value::Text("a<b>".into())])]);
        assert!(out.contains("<td>a<b></td>"));
    }

    #[test]
    fn test_mark_deleted_column() {
        let config = OutputConfig {
            mark_deleted: true,
            output_deleted: true,
            ..OutputConfig::default()
        };
        let ctx = context(config);
        let mut r = row(vec![Value::Int(1), Value::Text("x".into())]);
        r.deleted = true;
        let out = render(&ctx, &[r]);
        assert!(out.contains("<th>deleted</th>"));
        assert!(out.contains("<td>1</td></tr>"));
    }
}
