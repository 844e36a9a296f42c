//! Field selection
//!
//! A name filter is compiled once per run into a per-field inclusion
//! mask; lookups afterwards are O(1). No pattern means every field is
//! selected without materializing a mask.

use regex::RegexBuilder;

use crate::error::Result;
use crate::schema::Schema;

/// Compiled per-field inclusion mask.
#[derive(Debug, Clone)]
pub struct FieldSelection {
    mask: Option<Vec<bool>>,
}

impl FieldSelection {
    /// Select every field.
    pub fn all() -> Self {
        Self { mask: None }
    }

    /// Compile `pattern` (extended regex, case-insensitive) against the
    /// schema's field names. A pattern that fails to compile is a fatal
    /// configuration error.
    pub fn compile(pattern: Option<&str>, schema: &Schema) -> Result<Self> {
        let Some(pattern) = pattern else {
            return Ok(Self::all());
        };
        let re = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        let mask = schema
            .fields()
            .iter()
            .map(|f| re.is_match(&f.name))
            .collect();
        Ok(Self { mask: Some(mask) })
    }

    /// Whether field `index` is selected.
    pub fn is_selected(&self, index: usize) -> bool {
        match &self.mask {
            None => true,
            Some(mask) => mask.get(index).copied().unwrap_or(false),
        }
    }

    /// Number of selected fields in a schema of `field_count` fields.
    pub fn selected_count(&self, field_count: usize) -> usize {
        match &self.mask {
            None => field_count,
            Some(mask) => mask.iter().filter(|&&b| b).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDescriptor, TypeTag};

    fn schema() -> Schema {
        Schema::new(vec![
            FieldDescriptor::new("ID", TypeTag::Long, 4),
            FieldDescriptor::new("Name", TypeTag::Alpha, 20),
            FieldDescriptor::new("id_ref", TypeTag::Long, 4),
        ])
    }

    #[test]
    fn test_no_pattern_selects_everything() {
        let sel = FieldSelection::compile(None, &schema()).unwrap();
        assert!(sel.is_selected(0));
        assert!(sel.is_selected(1));
        assert!(sel.is_selected(2));
        assert_eq!(sel.selected_count(3), 3);
    }

    #[test]
    fn test_anchored_pattern_is_case_insensitive() {
        let sel = FieldSelection::compile(Some("^id$"), &schema()).unwrap();
        assert!(sel.is_selected(0)); // "ID"
        assert!(!sel.is_selected(1)); // "Name"
        assert!(!sel.is_selected(2)); // "id_ref" does not match anchored
        assert_eq!(sel.selected_count(3), 1);
    }

    #[test]
    fn test_unanchored_pattern_matches_substrings() {
        let sel = FieldSelection::compile(Some("id"), &schema()).unwrap();
        assert!(sel.is_selected(0));
        assert!(!sel.is_selected(1));
        assert!(sel.is_selected(2));
    }

    #[test]
    fn test_bad_pattern_is_fatal() {
        assert!(FieldSelection::compile(Some("(["), &schema()).is_err());
    }
}
