//! Row pipeline
//!
//! Drives one export run: iterates record ordinals in order, fetches
//! raw bytes from the store, decodes the selected fields, applies the
//! blob policy and hands each row to the active formatter. Per-record
//! fetch failures are logged and skipped; per-field failures degrade to
//! an absent cell. Neither aborts the run.

use std::fs;
use std::io::Write;

use pardus_core::blob;
use pardus_core::decode::decode;
use pardus_core::schema::{FieldDescriptor, Schema, TableMeta};
use pardus_core::store::{Placement, RawRecord, RecordStore};
use pardus_core::value::{BlobDescriptor, Value};
use pardus_core::FieldSelection;

use crate::config::OutputConfig;
use crate::error::Result;
use crate::output::Formatter;

/// Everything a formatter needs besides the rows: header metadata, the
/// schema, the selected field indices and the run's output policy.
#[derive(Debug, Clone)]
pub struct ExportContext {
    pub meta: TableMeta,
    pub schema: Schema,
    /// Indices of the selected fields, in schema order
    pub selected: Vec<usize>,
    pub config: OutputConfig,
    pub record_count: u32,
    pub theoretical_record_count: u32,
}

impl ExportContext {
    /// Build a context for `store` with a compiled field selection.
    pub fn new(store: &dyn RecordStore, selection: &FieldSelection, config: OutputConfig) -> Self {
        let schema = store.schema().clone();
        let selected = (0..schema.len())
            .filter(|&i| selection.is_selected(i))
            .collect();
        Self {
            meta: store.meta().clone(),
            schema,
            selected,
            config,
            record_count: store.record_count(),
            theoretical_record_count: store.theoretical_record_count(),
        }
    }

    /// The selected field descriptors, in schema order.
    pub fn selected_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.selected.iter().map(|&i| &self.schema.fields()[i])
    }
}

/// One decoded row on its way to a formatter.
///
/// `values` holds one entry per selected field; `raw` keeps the record
/// bytes for the diagnostic formatter. Both are dropped when the row has
/// been written.
#[derive(Debug, Clone)]
pub struct ExportRow {
    pub ordinal: u32,
    pub deleted: bool,
    pub placement: Option<Placement>,
    pub values: Vec<Value>,
    pub raw: Vec<u8>,
}

/// Run a full export: preamble, rows in ordinal order, footer.
///
/// Returns the number of rows handed to the formatter.
pub fn run_export(
    store: &mut dyn RecordStore,
    ctx: &ExportContext,
    formatter: &mut dyn Formatter,
    w: &mut dyn Write,
) -> Result<u64> {
    formatter.write_preamble(w, ctx)?;

    let mut written = 0u64;
    if formatter.wants_rows() {
        for ordinal in 0..ctx.theoretical_record_count {
            let record = match store.fetch_record(ordinal) {
                Ok(Some(record)) => record,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(ordinal, error = %e, "could not fetch record, skipping");
                    continue;
                }
            };
            if record.deleted && !ctx.config.output_deleted {
                continue;
            }

            let row = decode_record(store, ctx, ordinal, record);
            formatter.write_row(w, ctx, &row)?;
            written += 1;
        }
    }

    formatter.write_footer(w, ctx)?;
    w.flush()?;
    Ok(written)
}

/// Decode the selected fields of one fetched record.
fn decode_record(
    store: &mut dyn RecordStore,
    ctx: &ExportContext,
    ordinal: u32,
    record: RawRecord,
) -> ExportRow {
    let mut values = Vec::with_capacity(ctx.selected.len());
    for &idx in &ctx.selected {
        let field = &ctx.schema.fields()[idx];
        let value = match ctx.schema.field_bytes(&record.bytes, idx) {
            None => {
                tracing::warn!(ordinal, field = %field.name, "record too short for field");
                Value::Absent
            }
            Some(span) => match decode(field, span) {
                Ok(Value::Blob(desc)) => blob_cell(store, ctx, field, desc, span),
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(ordinal, field = %field.name, error = %e, "field decode failed");
                    Value::Absent
                }
            },
        };
        values.push(value);
    }

    ExportRow {
        ordinal,
        deleted: record.deleted,
        placement: record.placement,
        values,
        raw: record.bytes,
    }
}

/// Turn a blob descriptor into its output cell.
///
/// Memo payloads are inlined as text; other blob payloads are written to
/// `<prefix>_<mod_nr>.blob` and the cell names the artifact. With a
/// payload but no prefix the cell carries a hex rendering of the raw
/// descriptor bytes. Unresolvable payloads degrade to an absent cell.
fn blob_cell(
    store: &mut dyn RecordStore,
    ctx: &ExportContext,
    field: &FieldDescriptor,
    desc: BlobDescriptor,
    span: &[u8],
) -> Value {
    if !ctx.config.include_blobs {
        return Value::Absent;
    }
    match blob::resolve(store, &desc) {
        Ok(Some(payload)) => {
            if field.type_tag.is_memo() {
                Value::Text(String::from_utf8_lossy(&payload).into_owned())
            } else if let Some(prefix) = &ctx.config.blob_prefix {
                let name = blob::artifact_name(prefix, desc.mod_nr);
                match fs::write(&name, &payload) {
                    Ok(()) => Value::Text(name),
                    Err(e) => {
                        tracing::warn!(file = %name, error = %e, "could not write blob artifact");
                        Value::Absent
                    }
                }
            } else {
                Value::Text(blob::hex_string(BlobDescriptor::raw_bytes(span)))
            }
        }
        Ok(None) => {
            tracing::warn!(
                field = %field.name,
                mod_nr = desc.mod_nr,
                "blob payload unavailable"
            );
            Value::Absent
        }
        Err(e) => {
            tracing::warn!(field = %field.name, error = %e, "blob fetch failed");
            Value::Absent
        }
    }
}
