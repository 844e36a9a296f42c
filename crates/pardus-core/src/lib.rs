//! Pardus core - data model and decoding for Paradox table files
//!
//! This crate provides the pieces an exporter needs below the output
//! layer:
//!
//! - [`schema`]: field descriptors, type tags and table metadata
//! - [`value`]: the tagged value model produced by decoding
//! - [`decode`]: pure typed-field decoding of raw record bytes
//! - [`select`]: compiled case-insensitive field name filters
//! - [`blob`]: resolution of out-of-line blob payloads
//! - [`store`]: the record store seam plus the built-in backends
//!
//! Decoding never mutates the source buffer and never reads past the
//! span it is handed; null ("absent") detection follows the legacy
//! format's presence-sentinel and all-zero conventions.

pub mod blob;
pub mod calendar;
pub mod decode;
pub mod error;
pub mod schema;
pub mod select;
pub mod store;
pub mod value;

pub use error::{Error, Result};
pub use schema::{FieldDescriptor, Schema, TableMeta, TypeTag};
pub use select::FieldSelection;
pub use store::{ParadoxFile, Placement, RawRecord, RecordStore};
pub use store::memory::MemoryStore;
pub use value::{BlobDescriptor, Value};
