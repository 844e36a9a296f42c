//! Run configuration
//!
//! Builds the immutable per-run [`OutputConfig`] from parsed arguments
//! and the table header, and validates SQL type override specs before
//! any record is processed (bad specs are fatal configuration errors).

use pardus_core::{TableMeta, TypeTag};

use crate::cli::ExportArgs;
use crate::error::{CliError, Result};

/// Immutable output policy for one export run.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Field separator for delimited output
    pub delimiter: char,
    /// Enclosure character for delimited output
    pub enclosure: char,
    /// Table name used in headers and DDL
    pub table_name: String,
    /// Resolve and export blob fields
    pub include_blobs: bool,
    /// Append a trailing boolean `deleted` column
    pub mark_deleted: bool,
    /// Include soft-deleted records
    pub output_deleted: bool,
    /// Promote trimmed-empty character values to NULL
    pub empty_string_is_null: bool,
    /// Prefix for blob artifact files
    pub blob_prefix: Option<String>,
    /// Emit the CSV header line
    pub with_header: bool,
}

impl OutputConfig {
    /// Build a config from the shared export arguments, falling back to
    /// the file header's table name.
    pub fn from_args(args: &ExportArgs, meta: &TableMeta) -> Self {
        Self {
            delimiter: ';',
            enclosure: '"',
            table_name: args
                .table
                .clone()
                .unwrap_or_else(|| default_table_name(meta)),
            include_blobs: !args.skip_blobs,
            mark_deleted: args.mark_deleted,
            output_deleted: args.include_deleted,
            empty_string_is_null: args.empty_string_null,
            blob_prefix: args.blob_prefix.clone(),
            with_header: false,
        }
    }

    /// Set the delimited-text separator and enclosure.
    pub fn with_separators(mut self, delimiter: char, enclosure: char) -> Self {
        self.delimiter = delimiter;
        self.enclosure = enclosure;
        self
    }

    /// Enable the CSV header line.
    pub fn with_header(mut self, with_header: bool) -> Self {
        self.with_header = with_header;
        self
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            delimiter: ';',
            enclosure: '"',
            table_name: "table".to_string(),
            include_blobs: true,
            mark_deleted: false,
            output_deleted: false,
            empty_string_is_null: false,
            blob_prefix: None,
            with_header: false,
        }
    }
}

/// Table name from the header, with a fallback for files whose header
/// carries none.
fn default_table_name(meta: &TableMeta) -> String {
    let name = meta.table_name.trim();
    // Header table names often carry a .DB suffix
    let name = name
        .strip_suffix(".db")
        .or_else(|| name.strip_suffix(".DB"))
        .unwrap_or(name);
    if name.is_empty() {
        "table".to_string()
    } else {
        name.to_string()
    }
}

/// Parse `--sql-type CODE=TEMPLATE` overrides.
///
/// The code is a one-character field type code; the template may contain
/// `{len}`, replaced with the field's byte length. Malformed specs are
/// fatal configuration errors.
pub fn parse_type_overrides(specs: &[String]) -> Result<Vec<(TypeTag, String)>> {
    let mut overrides = Vec::with_capacity(specs.len());
    for spec in specs {
        let (code, template) = spec.split_once('=').ok_or_else(|| {
            CliError::InvalidArgument(format!(
                "sql type override '{}' is not of the form CODE=TEMPLATE",
                spec
            ))
        })?;
        let mut chars = code.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return Err(CliError::InvalidArgument(format!(
                "sql type override '{}' needs a one-character field type code",
                spec
            )));
        };
        let tag = TypeTag::from_code(c).ok_or_else(|| {
            CliError::InvalidArgument(format!("unknown field type code '{}'", c))
        })?;
        if template.is_empty() {
            return Err(CliError::InvalidArgument(format!(
                "sql type override '{}' has an empty template",
                spec
            )));
        }
        overrides.push((tag, template.to_string()));
    }
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(name: &str) -> TableMeta {
        TableMeta {
            table_name: name.to_string(),
            file_type: 2,
            file_version: 70,
            code_page: 437,
            primary_key_fields: 0,
            write_protected: false,
        }
    }

    fn export_args() -> ExportArgs {
        ExportArgs {
            fields: None,
            blob_prefix: None,
            skip_blobs: false,
            include_deleted: false,
            mark_deleted: false,
            empty_string_null: false,
            table: None,
        }
    }

    #[test]
    fn test_table_name_from_header() {
        let cfg = OutputConfig::from_args(&export_args(), &meta("stock.DB"));
        assert_eq!(cfg.table_name, "stock");
    }

    #[test]
    fn test_table_name_override() {
        let mut args = export_args();
        args.table = Some("inventory".to_string());
        let cfg = OutputConfig::from_args(&args, &meta("stock.DB"));
        assert_eq!(cfg.table_name, "inventory");
    }

    #[test]
    fn test_empty_header_name_falls_back() {
        let cfg = OutputConfig::from_args(&export_args(), &meta(""));
        assert_eq!(cfg.table_name, "table");
    }

    #[test]
    fn test_parse_type_overrides() {
        let specs = vec![
            "A=varchar({len})".to_string(),
            "N=numeric(20,2)".to_string(),
        ];
        let overrides = parse_type_overrides(&specs).unwrap();
        assert_eq!(overrides[0], (TypeTag::Alpha, "varchar({len})".to_string()));
        assert_eq!(overrides[1], (TypeTag::Number, "numeric(20,2)".to_string()));
    }

    #[test]
    fn test_parse_type_override_errors() {
        for bad in ["novalue", "AB=text", "?=text", "A="] {
            assert!(
                parse_type_overrides(&[bad.to_string()]).is_err(),
                "spec '{}' should be rejected",
                bad
            );
        }
    }
}
