use anyhow::{Result, bail};
use flate2::Compression;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ArchiveError;
use crate::io::{LocalFileSink, OffsetWriter, absolute_path, resolve_archive_name};
use crate::npy::{Element, ElementKind, NPY_EXTENSION, NpyHeader};

use super::compressor::compress_chunks;
use super::structures::{
    CentralDirectoryHeader, CompressionMethod, DosDateTime, EndOfCentralDirectory,
    LocalFileHeader,
};

/// Per-entry settings for [`ArchiveWriter::add_entry`]
#[derive(Debug, Clone, Copy)]
pub struct EntryOptions {
    compression_method: CompressionMethod,
    compression_level: Compression,
    timestamp: Option<i64>,
}

impl Default for EntryOptions {
    fn default() -> Self {
        Self {
            compression_method: CompressionMethod::Stored,
            compression_level: Compression::default(),
            timestamp: None,
        }
    }
}

impl EntryOptions {
    pub fn compression_method(mut self, method: CompressionMethod) -> Self {
        self.compression_method = method;
        self
    }

    /// Deflate level, 0-9. Values above 9 are clamped to 9.
    /// Ignored for stored entries.
    pub fn compression_level(mut self, level: u32) -> Self {
        self.compression_level = Compression::new(level.min(9));
        self
    }

    /// Modification time in seconds since the Unix epoch (UTC).
    /// Entries without one are stamped with the current time.
    pub fn timestamp(mut self, seconds: i64) -> Self {
        self.timestamp = Some(seconds);
        self
    }

    fn modified(&self) -> Result<DosDateTime> {
        match self.timestamp {
            Some(seconds) => DosDateTime::from_unix(seconds),
            None => Ok(DosDateTime::now()),
        }
    }
}

/// Metadata of an entry already written to the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    pub name: String,
    pub compression_method: CompressionMethod,
    pub modified: DosDateTime,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    /// Position of the local file header in the archive
    pub local_header_offset: u32,
}

/// Streaming ZIP / NPZ writer.
///
/// Each entry is written to the sink as soon as it is added: local header,
/// name, payload. Central directory records are collected in memory and
/// written, followed by the end record, when the archive is closed.
///
/// The writer is not synchronized. Callers adding entries from several
/// threads must serialize access themselves, e.g. with a `Mutex`.
///
/// ## Example
///
/// ```no_run
/// use npzip::{ArchiveWriter, EntryOptions};
///
/// fn main() -> anyhow::Result<()> {
///     let mut npz = ArchiveWriter::open("weights")?; // creates weights.npz
///     npz.add_typed_array("bias", &[0.5f32, -0.25, 1.0], &[3], None)?;
///     npz.add_file("README.txt", b"trained on run 7\n", EntryOptions::default())?;
///     npz.close()?;
///     Ok(())
/// }
/// ```
pub struct ArchiveWriter<W: Write> {
    /// `None` once the archive is closed
    sink: Option<OffsetWriter<W>>,
    /// Set for archives created with [`ArchiveWriter::open`]
    path: Option<PathBuf>,
    central_directory: Vec<u8>,
    entries: Vec<EntryRecord>,
}

impl ArchiveWriter<LocalFileSink> {
    /// Create an archive file, truncating any existing one.
    ///
    /// `.npz` is appended unless the name already ends in `.npz` or `.zip`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = resolve_archive_name(path.as_ref());
        let mut archive = Self::new(LocalFileSink::create(&path)?);
        archive.path = Some(path);
        Ok(archive)
    }
}

impl<W: Write> ArchiveWriter<W> {
    /// Write an archive to any sink, e.g. a `Vec<u8>`
    pub fn new(writer: W) -> Self {
        Self {
            sink: Some(OffsetWriter::new(writer)),
            path: None,
            central_directory: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// File name of the archive after extension resolution, for archives
    /// created with [`open`](ArchiveWriter::open)
    pub fn name(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Absolute path of the archive file. Still available after close.
    pub fn full_path(&self) -> Option<PathBuf> {
        self.path.as_deref().map(absolute_path)
    }

    pub fn entry_count(&self) -> u16 {
        self.entries.len() as u16
    }

    pub fn entries(&self) -> &[EntryRecord] {
        &self.entries
    }

    pub fn is_closed(&self) -> bool {
        self.sink.is_none()
    }

    /// Add one entry whose payload is the concatenation of `chunks`.
    ///
    /// Returns the number of payload bytes written to the archive (the
    /// compressed size for deflated entries).
    pub fn add_entry(&mut self, name: &str, chunks: &[&[u8]], options: EntryOptions) -> Result<u64> {
        if name.len() > u16::MAX as usize {
            bail!(ArchiveError::NameTooLong(name.len()));
        }
        if self.entries.len() >= u16::MAX as usize {
            bail!(ArchiveError::TooManyEntries);
        }
        let Some(sink) = self.sink.as_mut() else {
            bail!(ArchiveError::Closed);
        };

        let total: u64 = chunks.iter().map(|c| c.len() as u64).sum();
        let uncompressed_size = u32::try_from(total).map_err(|_| ArchiveError::EntryTooLarge {
            name: name.to_string(),
            size: total,
        })?;
        let offset = sink.offset();
        let local_header_offset =
            u32::try_from(offset).map_err(|_| ArchiveError::ArchiveTooLarge(offset))?;
        let modified = options.modified()?;

        let mut hasher = crc32fast::Hasher::new();
        for chunk in chunks {
            hasher.update(chunk);
        }
        let crc32 = hasher.finalize();

        let compressed = match options.compression_method {
            CompressionMethod::Deflate => Some(compress_chunks(chunks, options.compression_level)?),
            CompressionMethod::Stored => None,
        };
        let compressed_size = match &compressed {
            Some(data) => u32::try_from(data.len()).map_err(|_| ArchiveError::EntryTooLarge {
                name: name.to_string(),
                size: data.len() as u64,
            })?,
            None => uncompressed_size,
        };

        let header = LocalFileHeader {
            compression_method: options.compression_method,
            modified,
            crc32,
            compressed_size,
            uncompressed_size,
            file_name_len: name.len() as u16,
        };

        header.write_to(sink)?;
        sink.write_all(name.as_bytes())?;
        match &compressed {
            Some(data) => sink.write_all(data)?,
            None => {
                for chunk in chunks {
                    sink.write_all(chunk)?;
                }
            }
        }

        CentralDirectoryHeader {
            local: header,
            local_header_offset,
        }
        .write_to(&mut self.central_directory)?;
        self.central_directory.extend_from_slice(name.as_bytes());

        self.entries.push(EntryRecord {
            name: name.to_string(),
            compression_method: options.compression_method,
            modified,
            crc32,
            compressed_size,
            uncompressed_size,
            local_header_offset,
        });

        Ok(compressed_size as u64)
    }

    /// Add an entry with a single payload buffer
    pub fn add_file(&mut self, name: &str, data: &[u8], options: EntryOptions) -> Result<u64> {
        self.add_entry(name, &[data], options)
    }

    /// Add an `.npy` entry holding `data`, raw little-endian row-major
    /// elements of `kind`.
    ///
    /// `.npy` is appended to `name` when missing. Array entries are always
    /// stored uncompressed.
    pub fn add_array(
        &mut self,
        name: &str,
        kind: ElementKind,
        data: &[u8],
        shape: &[usize],
        timestamp: Option<i64>,
    ) -> Result<u64> {
        let header = NpyHeader::new(kind, shape)?;
        self.add_npy(name, &header, data, timestamp)
    }

    /// Like [`add_array`](Self::add_array) with the element kind taken from
    /// the slice type.
    pub fn add_typed_array<T: Element>(
        &mut self,
        name: &str,
        values: &[T],
        shape: &[usize],
        timestamp: Option<i64>,
    ) -> Result<u64> {
        let data = T::to_le_vec(values);
        self.add_array(name, T::KIND, &data, shape, timestamp)
    }

    /// Add an `.npy` entry for a prepared header, e.g. one built with
    /// [`NpyHeader::with_descr`] for a type not covered by [`ElementKind`].
    pub fn add_npy(
        &mut self,
        name: &str,
        header: &NpyHeader,
        data: &[u8],
        timestamp: Option<i64>,
    ) -> Result<u64> {
        let expected = header
            .data_len()
            .ok_or_else(|| ArchiveError::ShapeOverflow(header.shape().to_vec()))?;
        if expected != data.len() as u64 {
            bail!(ArchiveError::DataSizeMismatch {
                expected,
                actual: data.len() as u64,
            });
        }

        let full_name = if name.ends_with(NPY_EXTENSION) {
            name.to_string()
        } else {
            format!("{name}{NPY_EXTENSION}")
        };
        let header_bytes = header.to_bytes()?;

        let mut options = EntryOptions::default();
        if let Some(seconds) = timestamp {
            options = options.timestamp(seconds);
        }
        self.add_entry(&full_name, &[header_bytes.as_slice(), data], options)
    }

    /// Write the central directory and end record, then release the sink.
    ///
    /// Closing an already closed archive does nothing.
    pub fn close(&mut self) -> Result<()> {
        if let Some(sink) = self.sink.take() {
            self.write_trailer(sink)?;
        }
        Ok(())
    }

    /// Close the archive and return the underlying writer
    pub fn finish(mut self) -> Result<W> {
        let Some(sink) = self.sink.take() else {
            bail!(ArchiveError::Closed);
        };
        self.write_trailer(sink)
    }

    fn write_trailer(&self, mut sink: OffsetWriter<W>) -> Result<W> {
        let offset = sink.offset();
        let cd_offset = u32::try_from(offset).map_err(|_| ArchiveError::ArchiveTooLarge(offset))?;
        let cd_size = u32::try_from(self.central_directory.len())
            .map_err(|_| ArchiveError::ArchiveTooLarge(self.central_directory.len() as u64))?;

        sink.write_all(&self.central_directory)?;
        EndOfCentralDirectory {
            entries: self.entry_count(),
            cd_size,
            cd_offset,
        }
        .write_to(&mut sink)?;
        sink.flush()?;
        Ok(sink.into_inner())
    }
}

impl<W: Write> Drop for ArchiveWriter<W> {
    fn drop(&mut self) {
        // Errors cannot be reported from here; call `close` to see them.
        let _ = self.close();
    }
}
