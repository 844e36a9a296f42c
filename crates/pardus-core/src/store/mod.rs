//! The record store seam
//!
//! Everything below the decode pipeline - opening and validating files,
//! walking data blocks, locating a record's bytes, retrieving blob
//! payloads - sits behind [`RecordStore`]. Two backends ship with the
//! crate: [`memory::MemoryStore`] for embedders and tests, and
//! [`paradox::ParadoxFile`] for real table files.

pub mod memory;
pub mod paradox;

pub use paradox::ParadoxFile;

use crate::error::Result;
use crate::schema::{Schema, TableMeta};

/// Where a record sits in the file's block structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Data block number (1-based)
    pub block: u32,
    /// Previous block number, 0 when none
    pub prev_block: u32,
    /// Next block number, 0 when none
    pub next_block: u32,
    /// Record slot within the block (0-based)
    pub slot: u32,
}

/// One fetched record: raw bytes, deleted flag and placement.
///
/// Owned by the pipeline for a single iteration; never retained.
#[derive(Debug, Clone)]
pub struct RawRecord {
    /// The record's raw bytes, schema width long
    pub bytes: Vec<u8>,
    /// True when the slot holds a soft-deleted record
    pub deleted: bool,
    /// Block placement, when the backend tracks it
    pub placement: Option<Placement>,
}

/// Ordinal record access plus blob payload retrieval.
///
/// Ordinals run over the theoretical record sequence, i.e. every slot in
/// every data block including soft-deleted ones; callers filter on the
/// deleted flag.
pub trait RecordStore {
    /// Header metadata for info and DDL emission.
    fn meta(&self) -> &TableMeta;

    /// The table schema.
    fn schema(&self) -> &Schema;

    /// Number of live records.
    fn record_count(&self) -> u32;

    /// Number of record slots including soft-deleted ones.
    fn theoretical_record_count(&self) -> u32;

    /// Fetch the record at `ordinal`, or `None` when the ordinal does not
    /// resolve to a slot.
    fn fetch_record(&mut self, ordinal: u32) -> Result<Option<RawRecord>>;

    /// Fetch a blob payload by `(offset, size)`, or `None` when the
    /// payload is unavailable.
    fn fetch_blob(&mut self, offset: u32, size: u32) -> Result<Option<Vec<u8>>>;
}
