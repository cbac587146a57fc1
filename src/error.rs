//! Error conditions raised while building an archive.
//!
//! Functions in this crate return [`anyhow::Result`]. The conditions below are
//! the ones a caller may want to tell apart; recover them from an
//! [`anyhow::Error`] with `downcast_ref::<ArchiveError>()`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArchiveError {
    /// Entry names are stored in a 16-bit length field.
    #[error("Filename too long ({0} bytes): at most 65535 bytes are allowed")]
    NameTooLong(usize),

    #[error("Too many entries: a ZIP archive without zip64 holds at most 65535")]
    TooManyEntries,

    #[error("Entry {name} is too large ({size} bytes) for a ZIP archive without zip64")]
    EntryTooLarge { name: String, size: u64 },

    #[error("Archive offset {0} exceeds the 4 GiB limit of ZIP without zip64")]
    ArchiveTooLarge(u64),

    #[error("Timestamp {0} cannot be represented as an MS-DOS date (1980-2107)")]
    TimestampOutOfRange(i64),

    #[error("Array shape must have at least one dimension")]
    EmptyShape,

    #[error("Array header of {0} bytes does not fit a version 1.0 header")]
    HeaderTooLong(usize),

    #[error("Array shape {0:?} describes more than 2^64 bytes")]
    ShapeOverflow(Vec<usize>),

    #[error("Array data is {actual} bytes but shape and element width require {expected}")]
    DataSizeMismatch { expected: u64, actual: u64 },

    #[error("Archive is already closed")]
    Closed,

    /// The deflate encoder ended up in an unexpected state. The stream it was
    /// producing is unusable.
    #[error("Compressor invariant violated: {0}")]
    Compressor(String),
}
