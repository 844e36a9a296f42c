//! In-memory record store
//!
//! Backs tests, examples and embedders that already hold rows in memory.
//! Blob payloads live in a flat buffer addressed by `(offset, size)`,
//! mirroring how a blob file is addressed.

use crate::error::Result;
use crate::schema::{Schema, TableMeta};
use crate::store::{RawRecord, RecordStore};

/// A record store over in-memory rows.
#[derive(Debug)]
pub struct MemoryStore {
    meta: TableMeta,
    schema: Schema,
    records: Vec<(Vec<u8>, bool)>,
    blob_data: Option<Vec<u8>>,
}

impl MemoryStore {
    /// Create a store over `schema` with no rows.
    pub fn new(table_name: impl Into<String>, schema: Schema) -> Self {
        Self {
            meta: TableMeta {
                table_name: table_name.into(),
                file_type: 2,
                file_version: 70,
                code_page: 437,
                primary_key_fields: 0,
                write_protected: false,
            },
            schema,
            records: Vec::new(),
            blob_data: None,
        }
    }

    /// Set the number of leading primary-key fields.
    pub fn with_primary_key_fields(mut self, count: usize) -> Self {
        self.meta.primary_key_fields = count;
        self
    }

    /// Attach a flat blob buffer addressed by `(offset, size)`.
    pub fn with_blob_data(mut self, data: Vec<u8>) -> Self {
        self.blob_data = Some(data);
        self
    }

    /// Append a live record.
    pub fn push(&mut self, bytes: Vec<u8>) {
        self.records.push((bytes, false));
    }

    /// Append a soft-deleted record.
    pub fn push_deleted(&mut self, bytes: Vec<u8>) {
        self.records.push((bytes, true));
    }
}

impl RecordStore for MemoryStore {
    fn meta(&self) -> &TableMeta {
        &self.meta
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn record_count(&self) -> u32 {
        self.records.iter().filter(|(_, del)| !del).count() as u32
    }

    fn theoretical_record_count(&self) -> u32 {
        self.records.len() as u32
    }

    fn fetch_record(&mut self, ordinal: u32) -> Result<Option<RawRecord>> {
        Ok(self.records.get(ordinal as usize).map(|(bytes, deleted)| {
            RawRecord {
                bytes: bytes.clone(),
                deleted: *deleted,
                placement: None,
            }
        }))
    }

    fn fetch_blob(&mut self, offset: u32, size: u32) -> Result<Option<Vec<u8>>> {
        let Some(data) = &self.blob_data else {
            return Ok(None);
        };
        let start = offset as usize;
        let end = start + size as usize;
        Ok(data.get(start..end).map(|s| s.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDescriptor, TypeTag};

    fn store() -> MemoryStore {
        let schema = Schema::new(vec![FieldDescriptor::new("qty", TypeTag::Short, 2)]);
        MemoryStore::new("t", schema)
    }

    #[test]
    fn test_counts_exclude_deleted_from_live() {
        let mut s = store();
        s.push(vec![0, 1]);
        s.push_deleted(vec![0, 2]);
        s.push(vec![0, 3]);
        assert_eq!(s.record_count(), 2);
        assert_eq!(s.theoretical_record_count(), 3);
    }

    #[test]
    fn test_fetch_record_flags() {
        let mut s = store();
        s.push(vec![0, 1]);
        s.push_deleted(vec![0, 2]);
        assert!(!s.fetch_record(0).unwrap().unwrap().deleted);
        assert!(s.fetch_record(1).unwrap().unwrap().deleted);
        assert!(s.fetch_record(2).unwrap().is_none());
    }

    #[test]
    fn test_fetch_blob_bounds() {
        let s = store();
        let mut s = s.with_blob_data(b"hello world".to_vec());
        assert_eq!(s.fetch_blob(0, 5).unwrap(), Some(b"hello".to_vec()));
        assert_eq!(s.fetch_blob(6, 5).unwrap(), Some(b"world".to_vec()));
        assert_eq!(s.fetch_blob(6, 50).unwrap(), None);
    }

    #[test]
    fn test_fetch_blob_without_store() {
        let mut s = store();
        assert_eq!(s.fetch_blob(0, 5).unwrap(), None);
    }
}
