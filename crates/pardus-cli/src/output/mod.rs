//! Output formatters
//!
//! One formatter per export format:
//! - csv: delimited text with configurable separator/enclosure
//! - sql: CREATE TABLE / CREATE INDEX plus COPY or INSERT rows
//! - sqlite: load script wrapped in a single transaction
//! - html: a single table element
//! - info: table header metadata and the field list
//! - debug: raw record bytes with block placement

pub mod csv;
pub mod debug;
pub mod formatter;
pub mod html;
pub mod info;
pub mod sql;
pub mod sqlite;

pub use formatter::{create_formatter, Formatter, OutputFormat};

use pardus_core::schema::{FieldDescriptor, TypeTag};
use pardus_core::value::Value;

use crate::config::OutputConfig;

static ABSENT: Value = Value::Absent;

/// Apply the empty-string policy: a trimmed-empty character value is
/// promoted to Absent before null rendering when the config says so.
pub(crate) fn effective_value<'a>(
    value: &'a Value,
    field: &FieldDescriptor,
    config: &OutputConfig,
) -> &'a Value {
    if config.empty_string_is_null && field.type_tag == TypeTag::Alpha {
        if let Value::Text(s) = value {
            if s.is_empty() {
                return &ABSENT;
            }
        }
    }
    value
}

/// Plain text rendering of a present value; `None` for Absent.
///
/// Booleans render `1`/`0`; a blob descriptor that reached the output
/// layer unresolved renders its triple for diagnosis.
pub(crate) fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Absent => None,
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        Value::Int(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Text(s) => Some(s.clone()),
        Value::Blob(d) => Some(format!(
            "offset={} size={} mod_nr={}",
            d.offset, d.size, d.mod_nr
        )),
    }
}
