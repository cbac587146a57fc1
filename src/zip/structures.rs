use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};
use time::OffsetDateTime;

use anyhow::Result;

use crate::error::ArchiveError;

/// Version needed to extract / version made by: 2.0, plain deflate
pub const ZIP_VERSION: u16 = 20;

/// ZIP compression methods supported by the writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMethod {
    #[default]
    Stored,
    Deflate,
}

impl CompressionMethod {
    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
        }
    }
}

/// Modification time in MS-DOS format (2-second resolution, 1980-2107)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosDateTime {
    pub time: u16,
    pub date: u16,
}

impl DosDateTime {
    /// Convert seconds since the Unix epoch, interpreted as UTC
    pub fn from_unix(seconds: i64) -> Result<Self> {
        let datetime = OffsetDateTime::from_unix_timestamp(seconds)
            .map_err(|_| ArchiveError::TimestampOutOfRange(seconds))?;
        Self::from_datetime(datetime).ok_or_else(|| ArchiveError::TimestampOutOfRange(seconds).into())
    }

    /// Current UTC time, falling back to the DOS epoch if the clock is out of range
    pub fn now() -> Self {
        Self::from_datetime(OffsetDateTime::now_utc()).unwrap_or(Self::EPOCH)
    }

    /// 1980-01-01 00:00:00
    pub const EPOCH: Self = Self {
        time: 0,
        date: (1 << 5) | 1,
    };

    fn from_datetime(datetime: OffsetDateTime) -> Option<Self> {
        let year = datetime.year();
        if !(1980..=2107).contains(&year) {
            return None;
        }
        let time = ((datetime.hour() as u16) << 11)
            + ((datetime.minute() as u16) << 5)
            + (datetime.second() as u16 / 2);
        let date = (((year - 1980) as u16) << 9)
            + ((u8::from(datetime.month()) as u16) << 5)
            + datetime.day() as u16;
        Some(Self { time, date })
    }
}

/// Local File Header (LFH) - 30 bytes including the signature
///
/// On disk the header is followed by the file name and the payload; no extra
/// field is ever written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileHeader {
    pub compression_method: CompressionMethod,
    pub modified: DosDateTime,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_len: u16,
}

impl LocalFileHeader {
    pub const SIGNATURE: u32 = 0x04034b50;
    /// Fields after the signature
    pub const FIELDS_SIZE: usize = 26;
    pub const SIZE: usize = 4 + Self::FIELDS_SIZE;

    /// Write the fixed fields without the signature. The central directory
    /// header repeats exactly these 26 bytes.
    pub fn write_fields<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        // version needed to extract
        writer.write_u16::<LittleEndian>(ZIP_VERSION)?;
        // general purpose bit flag: no encryption, no data descriptor
        writer.write_u16::<LittleEndian>(0)?;
        writer.write_u16::<LittleEndian>(self.compression_method.as_u16())?;
        writer.write_u16::<LittleEndian>(self.modified.time)?;
        writer.write_u16::<LittleEndian>(self.modified.date)?;
        writer.write_u32::<LittleEndian>(self.crc32)?;
        writer.write_u32::<LittleEndian>(self.compressed_size)?;
        writer.write_u32::<LittleEndian>(self.uncompressed_size)?;
        writer.write_u16::<LittleEndian>(self.file_name_len)?;
        // extra field length
        writer.write_u16::<LittleEndian>(0)?;
        Ok(())
    }

    /// Write signature and fields
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(Self::SIGNATURE)?;
        self.write_fields(writer)
    }
}

/// Central Directory File Header (CDFH) - 46 bytes including the signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralDirectoryHeader {
    pub local: LocalFileHeader,
    pub local_header_offset: u32,
}

impl CentralDirectoryHeader {
    pub const SIGNATURE: u32 = 0x02014b50;
    pub const SIZE: usize = 4 + 2 + LocalFileHeader::FIELDS_SIZE + 16;

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(Self::SIGNATURE)?;
        writer.write_u16::<LittleEndian>(ZIP_VERSION)?;
        self.local.write_fields(writer)?;
        // file comment length
        writer.write_u16::<LittleEndian>(0)?;
        // disk number start
        writer.write_u16::<LittleEndian>(0)?;
        // internal file attributes
        writer.write_u16::<LittleEndian>(0)?;
        // external file attributes, no permission bits
        writer.write_u32::<LittleEndian>(0)?;
        writer.write_u32::<LittleEndian>(self.local_header_offset)?;
        Ok(())
    }
}

/// End of Central Directory (EOCD) - 22 bytes, no comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    pub entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: u32 = 0x06054b50;
    pub const SIZE: usize = 22;

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(Self::SIGNATURE)?;
        // number of this disk, disk where the central directory starts
        writer.write_u16::<LittleEndian>(0)?;
        writer.write_u16::<LittleEndian>(0)?;
        // entries on this disk, total entries
        writer.write_u16::<LittleEndian>(self.entries)?;
        writer.write_u16::<LittleEndian>(self.entries)?;
        writer.write_u32::<LittleEndian>(self.cd_size)?;
        writer.write_u32::<LittleEndian>(self.cd_offset)?;
        // comment length
        writer.write_u16::<LittleEndian>(0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> LocalFileHeader {
        LocalFileHeader {
            compression_method: CompressionMethod::Deflate,
            modified: DosDateTime {
                time: 0x1234,
                date: 0x5678,
            },
            crc32: 0xdeadbeef,
            compressed_size: 7,
            uncompressed_size: 300,
            file_name_len: 10,
        }
    }

    #[test]
    fn local_header_layout() {
        let mut buf = Vec::new();
        sample_header().write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), LocalFileHeader::SIZE);
        assert_eq!(
            buf,
            [
                0x50, 0x4b, 0x03, 0x04, // signature
                20, 0, // version needed
                0, 0, // flags
                8, 0, // method
                0x34, 0x12, // time
                0x78, 0x56, // date
                0xef, 0xbe, 0xad, 0xde, // crc
                7, 0, 0, 0, // compressed
                0x2c, 0x01, 0, 0, // uncompressed
                10, 0, // name length
                0, 0, // extra length
            ]
        );
    }

    #[test]
    fn central_header_repeats_local_fields() {
        let local = sample_header();
        let mut fields = Vec::new();
        local.write_fields(&mut fields).unwrap();

        let mut buf = Vec::new();
        CentralDirectoryHeader {
            local,
            local_header_offset: 0x01020304,
        }
        .write_to(&mut buf)
        .unwrap();

        assert_eq!(buf.len(), CentralDirectoryHeader::SIZE);
        assert_eq!(&buf[0..4], b"PK\x01\x02");
        assert_eq!(&buf[4..6], &[20, 0]);
        assert_eq!(&buf[6..32], &fields[..]);
        assert_eq!(&buf[32..42], &[0u8; 10]);
        assert_eq!(&buf[42..46], &[4, 3, 2, 1]);
    }

    #[test]
    fn end_record_layout() {
        let mut buf = Vec::new();
        EndOfCentralDirectory {
            entries: 3,
            cd_size: 0x100,
            cd_offset: 0x2000,
        }
        .write_to(&mut buf)
        .unwrap();
        assert_eq!(
            buf,
            [
                0x50, 0x4b, 0x05, 0x06, 0, 0, 0, 0, 3, 0, 3, 0, 0, 1, 0, 0, 0, 0x20, 0, 0, 0, 0
            ]
        );
    }

    #[test]
    fn dos_time_from_unix() {
        // 2024-02-29 13:45:31 UTC
        let dos = DosDateTime::from_unix(1_709_214_331).unwrap();
        assert_eq!(dos.time, (13 << 11) + (45 << 5) + 15);
        assert_eq!(dos.date, ((2024 - 1980) << 9) + (2 << 5) + 29);
    }

    #[test]
    fn dos_time_rejects_pre_1980() {
        let err = DosDateTime::from_unix(0).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ArchiveError>(),
            Some(&ArchiveError::TimestampOutOfRange(0))
        );
    }
}
