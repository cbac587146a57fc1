//! # npzip
//!
//! Streaming writer for ZIP archives and NumPy `.npz` files.
//!
//! Entries go straight to the output as they are added; only the central
//! directory is kept in memory until the archive is closed. Array entries are
//! written in the NumPy `.npy` 1.0 format, so the result loads with
//! `numpy.load`.
//!
//! ## Features
//!
//! - STORED and raw DEFLATE entries, with payloads given as several fragments
//! - `.npy` headers for integer, float, complex and byte-string arrays
//! - CRC-32 on every entry
//! - Any `std::io::Write` as output, or a local file via [`ArchiveWriter::open`]
//!
//! ## Example
//!
//! ```no_run
//! use npzip::{ArchiveWriter, CompressionMethod, EntryOptions};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut npz = ArchiveWriter::open("results")?;
//!
//!     let matrix = [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0];
//!     npz.add_typed_array("matrix", &matrix, &[2, 3], None)?;
//!
//!     let options = EntryOptions::default().compression_method(CompressionMethod::Deflate);
//!     npz.add_file("log.txt", b"converged after 12 iterations\n", options)?;
//!
//!     npz.close()?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod npy;
pub mod zip;

pub use cli::Cli;
pub use error::ArchiveError;
pub use io::{LocalFileSink, OffsetWriter};
pub use npy::{Element, ElementKind, NpyHeader};
pub use zip::{ArchiveWriter, CompressionMethod, DosDateTime, EntryOptions, EntryRecord};
