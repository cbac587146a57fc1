//! ZIP archive writing.
//!
//! ## Architecture
//!
//! - [`structures`]: byte-exact ZIP records (local header, central directory
//!   header, end record) and MS-DOS timestamps
//! - [`compressor`]: raw deflate over a sequence of payload fragments
//! - [`writer`]: the streaming [`ArchiveWriter`]
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and (compressed) data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! Entries are written front to back as they are added. Only the central
//! directory is buffered, since it can only be written once all entries are
//! known.
//!
//! ## Limitations
//!
//! - STORED and DEFLATE only
//! - No encryption, no multi-disk archives
//! - No ZIP64: at most 65535 entries, sizes and offsets below 4 GiB

pub mod compressor;
pub mod structures;
mod writer;

pub use compressor::{DeflateSession, SessionState, compress_chunks, deflate_bound};
pub use structures::*;
pub use writer::{ArchiveWriter, EntryOptions, EntryRecord};
