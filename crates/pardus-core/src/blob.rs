//! Blob resolution
//!
//! A blob-typed field carries only a [`BlobDescriptor`]; the payload
//! lives in the blob store and is fetched by `(offset, size)`. How a
//! resolved payload appears in the output (inlined, written to an
//! artifact, or rendered as a diagnostic) is the pipeline's policy.

use crate::error::Result;
use crate::store::RecordStore;
use crate::value::BlobDescriptor;

/// File extension of exported blob artifacts.
pub const ARTIFACT_EXT: &str = "blob";

/// Fetch the payload a descriptor points at.
///
/// Returns `Ok(None)` when the store has no payload for the descriptor;
/// the caller emits a diagnostic and treats the field as absent.
pub fn resolve(store: &mut dyn RecordStore, desc: &BlobDescriptor) -> Result<Option<Vec<u8>>> {
    if desc.size == 0 {
        return Ok(None);
    }
    store.fetch_blob(desc.offset, desc.size)
}

/// Artifact file name for an exported payload: `<prefix>_<mod_nr>.blob`.
pub fn artifact_name(prefix: &str, mod_nr: u16) -> String {
    format!("{}_{}.{}", prefix, mod_nr, ARTIFACT_EXT)
}

/// Lowercase hex rendering of raw bytes, for diagnostics.
pub fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
