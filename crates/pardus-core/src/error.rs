//! Error types for pardus-core

use thiserror::Error;

use crate::schema::TypeTag;

/// Core error type covering decoding, selection and store access.
#[derive(Error, Debug)]
pub enum Error {
    /// A field's byte span is shorter than its type requires.
    #[error("field span too short for {tag:?}: need {need} bytes, got {got}")]
    Truncated {
        tag: TypeTag,
        need: usize,
        got: usize,
    },

    /// A stored day count falls outside the supported calendar range.
    #[error("day count {0} outside the supported calendar range")]
    InvalidDayCount(i32),

    /// A field name filter failed to compile.
    #[error("invalid field filter pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The file does not look like a supported Paradox table file.
    #[error("bad table file: {0}")]
    BadHeader(String),

    /// A record ordinal points outside the file's data blocks.
    #[error("record {0} out of range")]
    RecordOutOfRange(u32),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for core results.
pub type Result<T> = std::result::Result<T, Error>;
