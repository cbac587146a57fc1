mod local;

pub use local::{DEFAULT_EXTENSION, LocalFileSink, absolute_path, resolve_archive_name};

use std::io::{self, Write};

/// Append-only writer that counts the bytes passed to the inner sink.
///
/// ZIP records refer to each other by absolute byte offset, so the archive
/// writer needs the current position without requiring `Seek` on the sink.
pub struct OffsetWriter<W: Write> {
    inner: W,
    offset: u64,
}

impl<W: Write> OffsetWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, offset: 0 }
    }

    /// Number of bytes written so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for OffsetWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.offset += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_every_written_byte() {
        let mut writer = OffsetWriter::new(Vec::new());
        writer.write_all(b"PK").unwrap();
        writer.write_all(&[]).unwrap();
        writer.write_all(b"\x03\x04").unwrap();
        assert_eq!(writer.offset(), 4);
        assert_eq!(writer.into_inner(), b"PK\x03\x04");
    }
}
