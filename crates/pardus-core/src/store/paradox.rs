//! Read-only Paradox table file backend
//!
//! Implements [`RecordStore`] over a memory-mapped 4.x-format `.DB` file
//! and an optional `.MB` blob file. Only what ordinal record fetch needs
//! is implemented: header and field-table parsing plus the sequential
//! data-block walk. Index files, encrypted files and write support are
//! not handled here.
//!
//! Data blocks are `max_table_size * 0x400` bytes, start right after the
//! header area and carry a 6-byte header (next block, previous block,
//! add-data size). A block's live record count is
//! `add_data_size / record_size + 1`; slots past that hold soft-deleted
//! slack records.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::error::{Error, Result};
use crate::schema::{FieldDescriptor, Schema, TableMeta, TypeTag};
use crate::store::{Placement, RawRecord, RecordStore};

const HEADER_RECORD_SIZE: usize = 0x00;
const HEADER_HEADER_SIZE: usize = 0x02;
const HEADER_FILE_TYPE: usize = 0x04;
const HEADER_MAX_TABLE_SIZE: usize = 0x05;
const HEADER_NUM_RECORDS: usize = 0x06;
const HEADER_USED_BLOCKS: usize = 0x0A;
const HEADER_FIRST_BLOCK: usize = 0x0E;
const HEADER_NUM_FIELDS: usize = 0x21;
const HEADER_PRIMARY_KEY_FIELDS: usize = 0x23;
const HEADER_WRITE_PROTECTED: usize = 0x38;
const HEADER_FILE_VERSION_ID: usize = 0x39;
const HEADER_CODE_PAGE: usize = 0x6A;
const HEADER_FIELD_INFO: usize = 0x78;

/// Size of the fixed table-name buffer following the pointer arrays.
const TABLE_NAME_BUF: usize = 79;

/// Size of a data block's header.
const BLOCK_HEADER: usize = 6;

#[derive(Debug, Clone, Copy)]
struct BlockInfo {
    block_no: u16,
    prev_block: u16,
    next_block: u16,
    live_records: u32,
    file_offset: usize,
}

/// A Paradox `.DB` table file, optionally paired with its `.MB` blob file.
pub struct ParadoxFile {
    map: Mmap,
    blob_map: Option<Mmap>,
    meta: TableMeta,
    schema: Schema,
    record_size: usize,
    records_per_block: u32,
    num_records: u32,
    blocks: Vec<BlockInfo>,
}

impl ParadoxFile {
    /// Open and validate a table file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        // Read-only mapping of an existing file
        let map = unsafe { Mmap::map(&file)? };
        Self::from_map(map)
    }

    /// Attach the `.MB` blob file payloads are fetched from.
    pub fn with_blob_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        self.blob_map = Some(unsafe { Mmap::map(&file)? });
        Ok(self)
    }

    fn from_map(map: Mmap) -> Result<Self> {
        let data: &[u8] = &map;
        if data.len() < HEADER_FIELD_INFO {
            return Err(Error::BadHeader("file shorter than a table header".into()));
        }

        let record_size = read_u16(data, HEADER_RECORD_SIZE) as usize;
        let header_size = read_u16(data, HEADER_HEADER_SIZE) as usize;
        let file_type = data[HEADER_FILE_TYPE];
        let max_table_size = data[HEADER_MAX_TABLE_SIZE];
        let num_records = read_u32(data, HEADER_NUM_RECORDS);
        let used_blocks = read_u16(data, HEADER_USED_BLOCKS);
        let first_block = read_u16(data, HEADER_FIRST_BLOCK);
        let num_fields = read_u16(data, HEADER_NUM_FIELDS) as usize;
        let primary_key_fields = read_u16(data, HEADER_PRIMARY_KEY_FIELDS) as usize;
        let write_protected = data[HEADER_WRITE_PROTECTED] != 0;
        let version_id = data[HEADER_FILE_VERSION_ID];
        let code_page = read_u16(data, HEADER_CODE_PAGE);

        if record_size == 0 {
            return Err(Error::BadHeader("zero record size".into()));
        }
        if !matches!(file_type, 0 | 2) {
            return Err(Error::BadHeader(format!(
                "file type {} is not a data file",
                file_type
            )));
        }
        if version_id < 5 {
            return Err(Error::BadHeader(format!(
                "unsupported pre-4.0 file (version id {})",
                version_id
            )));
        }
        if max_table_size == 0 {
            return Err(Error::BadHeader("zero block size".into()));
        }
        if header_size > data.len() {
            return Err(Error::BadHeader("header size beyond end of file".into()));
        }
        if num_fields == 0 {
            return Err(Error::BadHeader("table with no fields".into()));
        }

        tracing::debug!(
            record_size,
            num_fields,
            num_records,
            used_blocks,
            "parsed table header"
        );

        let (schema, table_name) = parse_field_table(data, header_size, num_fields)?;
        if schema.record_len() != record_size {
            return Err(Error::BadHeader(format!(
                "field lengths sum to {} but record size is {}",
                schema.record_len(),
                record_size
            )));
        }

        let block_size = max_table_size as usize * 0x400;
        let records_per_block = ((block_size - BLOCK_HEADER) / record_size) as u32;
        let blocks = walk_blocks(
            data,
            header_size,
            block_size,
            record_size,
            first_block,
            used_blocks,
        )?;

        let meta = TableMeta {
            table_name,
            file_type,
            file_version: version_from_id(version_id),
            code_page,
            primary_key_fields,
            write_protected,
        };

        Ok(Self {
            map,
            blob_map: None,
            meta,
            schema,
            record_size,
            records_per_block,
            num_records,
            blocks,
        })
    }
}

impl RecordStore for ParadoxFile {
    fn meta(&self) -> &TableMeta {
        &self.meta
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn record_count(&self) -> u32 {
        self.num_records
    }

    fn theoretical_record_count(&self) -> u32 {
        self.blocks.len() as u32 * self.records_per_block
    }

    fn fetch_record(&mut self, ordinal: u32) -> Result<Option<RawRecord>> {
        let block_idx = (ordinal / self.records_per_block) as usize;
        let slot = ordinal % self.records_per_block;
        let Some(block) = self.blocks.get(block_idx) else {
            return Ok(None);
        };

        let start = block.file_offset + BLOCK_HEADER + slot as usize * self.record_size;
        let end = start + self.record_size;
        let Some(bytes) = self.map.get(start..end) else {
            return Err(Error::RecordOutOfRange(ordinal));
        };

        Ok(Some(RawRecord {
            bytes: bytes.to_vec(),
            deleted: slot >= block.live_records,
            placement: Some(Placement {
                block: block.block_no as u32,
                prev_block: block.prev_block as u32,
                next_block: block.next_block as u32,
                slot,
            }),
        }))
    }

    fn fetch_blob(&mut self, offset: u32, size: u32) -> Result<Option<Vec<u8>>> {
        let Some(map) = &self.blob_map else {
            return Ok(None);
        };
        let start = offset as usize;
        let end = start + size as usize;
        Ok(map.get(start..end).map(|s| s.to_vec()))
    }
}

fn read_u16(data: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([data[off], data[off + 1]])
}

fn read_u32(data: &[u8], off: usize) -> u32 {
    u32::from_le_bytes([data[off], data[off + 1], data[off + 2], data[off + 3]])
}

fn version_from_id(id: u8) -> u16 {
    match id {
        3 => 30,
        4 => 35,
        5..=9 => 40,
        10 | 11 => 50,
        _ => 70,
    }
}

/// Parse the field type/length table, the name-pointer arrays and the
/// trailing name strings of a 4.0+ header.
fn parse_field_table(
    data: &[u8],
    header_size: usize,
    num_fields: usize,
) -> Result<(Schema, String)> {
    let info_end = HEADER_FIELD_INFO + num_fields * 2;
    let names_start = info_end + 4 + num_fields * 4; // table-name ptr + field-name ptrs
    let table_name_end = names_start + TABLE_NAME_BUF;
    if table_name_end > header_size || header_size > data.len() {
        return Err(Error::BadHeader("field table beyond header".into()));
    }

    let table_name = read_cstr(&data[names_start..table_name_end])
        .unwrap_or_default()
        .to_string();

    let mut fields = Vec::with_capacity(num_fields);
    let mut cursor = table_name_end;
    for i in 0..num_fields {
        let raw_tag = data[HEADER_FIELD_INFO + i * 2];
        let len = data[HEADER_FIELD_INFO + i * 2 + 1] as usize;
        let tag = TypeTag::from_raw(raw_tag).ok_or_else(|| {
            Error::BadHeader(format!("unknown field type 0x{:02X} for field {}", raw_tag, i))
        })?;

        let name = read_cstr(&data[cursor..header_size]).ok_or_else(|| {
            Error::BadHeader(format!("unterminated name for field {}", i))
        })?;
        cursor += name.len() + 1;
        fields.push(FieldDescriptor::new(name, tag, len));
    }

    Ok((Schema::new(fields), table_name))
}

fn read_cstr(data: &[u8]) -> Option<&str> {
    let nul = data.iter().position(|&b| b == 0)?;
    std::str::from_utf8(&data[..nul]).ok()
}

/// Walk the data-block chain from `first_block`, collecting placement
/// and live-record counts per block.
fn walk_blocks(
    data: &[u8],
    header_size: usize,
    block_size: usize,
    record_size: usize,
    first_block: u16,
    used_blocks: u16,
) -> Result<Vec<BlockInfo>> {
    let mut blocks = Vec::with_capacity(used_blocks as usize);
    let mut block_no = first_block;
    let mut prev = 0u16;

    while block_no != 0 && blocks.len() < used_blocks as usize {
        let offset = header_size + (block_no as usize - 1) * block_size;
        let Some(header) = data.get(offset..offset + BLOCK_HEADER) else {
            return Err(Error::BadHeader(format!(
                "data block {} beyond end of file",
                block_no
            )));
        };
        let next_block = u16::from_le_bytes([header[0], header[1]]);
        let prev_block = u16::from_le_bytes([header[2], header[3]]);
        let add_data_size = i16::from_le_bytes([header[4], header[5]]);

        let live_records = if add_data_size < 0 {
            0
        } else {
            add_data_size as u32 / record_size as u32 + 1
        };

        blocks.push(BlockInfo {
            block_no,
            prev_block: if prev_block != 0 { prev_block } else { prev },
            next_block,
            live_records,
            file_offset: offset,
        });

        prev = block_no;
        block_no = next_block;
    }

    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    /// Build a minimal 4.x-format table file: one Short field "qty",
    /// `rows` live records in the first block.
    fn build_table_file(rows: &[i16], slack: &[i16]) -> Vec<u8> {
        let record_size = 2u16;
        let header_size = 0x800u16;
        let num_fields = 1u16;
        let max_table_size = 1u8; // 1K blocks
        let block_size = 0x400usize;

        let mut data = vec![0u8; header_size as usize + block_size];
        data[HEADER_RECORD_SIZE..HEADER_RECORD_SIZE + 2]
            .copy_from_slice(&record_size.to_le_bytes());
        data[HEADER_HEADER_SIZE..HEADER_HEADER_SIZE + 2]
            .copy_from_slice(&header_size.to_le_bytes());
        data[HEADER_FILE_TYPE] = 2;
        data[HEADER_MAX_TABLE_SIZE] = max_table_size;
        data[HEADER_NUM_RECORDS..HEADER_NUM_RECORDS + 4]
            .copy_from_slice(&(rows.len() as u32).to_le_bytes());
        data[HEADER_USED_BLOCKS..HEADER_USED_BLOCKS + 2].copy_from_slice(&1u16.to_le_bytes());
        data[HEADER_FIRST_BLOCK..HEADER_FIRST_BLOCK + 2].copy_from_slice(&1u16.to_le_bytes());
        data[HEADER_NUM_FIELDS..HEADER_NUM_FIELDS + 2]
            .copy_from_slice(&num_fields.to_le_bytes());
        data[HEADER_PRIMARY_KEY_FIELDS..HEADER_PRIMARY_KEY_FIELDS + 2]
            .copy_from_slice(&1u16.to_le_bytes());
        data[HEADER_FILE_VERSION_ID] = 9;
        data[HEADER_CODE_PAGE..HEADER_CODE_PAGE + 2].copy_from_slice(&437u16.to_le_bytes());

        // Field info: one Short, 2 bytes
        data[HEADER_FIELD_INFO] = TypeTag::Short as u8;
        data[HEADER_FIELD_INFO + 1] = 2;

        // Pointer arrays (unused), 79-byte table name, field name
        let names_start = HEADER_FIELD_INFO + 2 + 4 + 4;
        data[names_start..names_start + 5].copy_from_slice(b"stock");
        let field_names = names_start + TABLE_NAME_BUF;
        data[field_names..field_names + 3].copy_from_slice(b"qty");

        // Block 1: no next/prev, add_data_size = (n-1) * record_size
        let block = header_size as usize;
        let add_data = if rows.is_empty() {
            -(record_size as i16)
        } else {
            (rows.len() as i16 - 1) * record_size as i16
        };
        data[block + 4..block + 6].copy_from_slice(&add_data.to_le_bytes());

        let mut cursor = block + BLOCK_HEADER;
        for v in rows.iter().chain(slack.iter()) {
            data[cursor..cursor + 2].copy_from_slice(&v.to_be_bytes());
            cursor += 2;
        }
        data
    }

    fn write_temp(data: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(data).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn test_open_parses_header_and_schema() {
        let file = write_temp(&build_table_file(&[5, 7], &[]));
        let store = ParadoxFile::open(file.path()).unwrap();

        assert_eq!(store.meta().table_name, "stock");
        assert_eq!(store.meta().file_type, 2);
        assert_eq!(store.meta().file_version, 40);
        assert_eq!(store.meta().code_page, 437);
        assert_eq!(store.meta().primary_key_fields, 1);
        assert_eq!(store.schema().len(), 1);
        assert_eq!(store.schema().fields()[0].name, "qty");
        assert_eq!(store.schema().fields()[0].type_tag, TypeTag::Short);
        assert_eq!(store.record_count(), 2);
    }

    #[test]
    fn test_fetch_records_in_order() {
        let file = write_temp(&build_table_file(&[5, 7, 9], &[]));
        let mut store = ParadoxFile::open(file.path()).unwrap();

        for (i, expect) in [5i16, 7, 9].iter().enumerate() {
            let rec = store.fetch_record(i as u32).unwrap().unwrap();
            assert!(!rec.deleted);
            assert_eq!(rec.bytes, expect.to_be_bytes());
            let placement = rec.placement.unwrap();
            assert_eq!(placement.block, 1);
            assert_eq!(placement.slot, i as u32);
        }
    }

    #[test]
    fn test_slack_slots_are_deleted() {
        let file = write_temp(&build_table_file(&[5], &[11]));
        let mut store = ParadoxFile::open(file.path()).unwrap();

        assert!(!store.fetch_record(0).unwrap().unwrap().deleted);
        let slack = store.fetch_record(1).unwrap().unwrap();
        assert!(slack.deleted);
        assert_eq!(slack.bytes, 11i16.to_be_bytes());
    }

    #[test]
    fn test_theoretical_count_covers_block_capacity() {
        let file = write_temp(&build_table_file(&[5], &[]));
        let store = ParadoxFile::open(file.path()).unwrap();
        // (1024 - 6) / 2 slots in the single block
        assert_eq!(store.theoretical_record_count(), 509);
        assert_eq!(store.record_count(), 1);
    }

    #[test]
    fn test_ordinal_past_blocks_is_none() {
        let file = write_temp(&build_table_file(&[5], &[]));
        let mut store = ParadoxFile::open(file.path()).unwrap();
        assert!(store.fetch_record(509).unwrap().is_none());
    }

    #[test]
    fn test_rejects_non_data_files() {
        let mut data = build_table_file(&[5], &[]);
        data[HEADER_FILE_TYPE] = 1; // primary index
        let file = write_temp(&data);
        assert!(matches!(
            ParadoxFile::open(file.path()),
            Err(Error::BadHeader(_))
        ));
    }

    #[test]
    fn test_rejects_pre_40_files() {
        let mut data = build_table_file(&[5], &[]);
        data[HEADER_FILE_VERSION_ID] = 3;
        let file = write_temp(&data);
        assert!(matches!(
            ParadoxFile::open(file.path()),
            Err(Error::BadHeader(_))
        ));
    }

    #[test]
    fn test_rejects_record_size_mismatch() {
        let mut data = build_table_file(&[5], &[]);
        data[HEADER_RECORD_SIZE] = 4; // schema says 2
        let file = write_temp(&data);
        assert!(matches!(
            ParadoxFile::open(file.path()),
            Err(Error::BadHeader(_))
        ));
    }

    #[test]
    fn test_blob_file_fetch() {
        let table = write_temp(&build_table_file(&[5], &[]));
        let blob = write_temp(b"0123456789abcdef");
        let mut store = ParadoxFile::open(table.path())
            .unwrap()
            .with_blob_file(blob.path())
            .unwrap();

        assert_eq!(store.fetch_blob(4, 6).unwrap(), Some(b"456789".to_vec()));
        assert_eq!(store.fetch_blob(12, 10).unwrap(), None);
    }

    #[test]
    fn test_no_blob_file_is_unavailable() {
        let table = write_temp(&build_table_file(&[5], &[]));
        let mut store = ParadoxFile::open(table.path()).unwrap();
        assert_eq!(store.fetch_blob(0, 4).unwrap(), None);
    }
}
