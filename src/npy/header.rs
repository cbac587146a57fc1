use anyhow::Result;
use byteorder::{LittleEndian, WriteBytesExt};

use super::ElementKind;
use crate::error::ArchiveError;

pub const NPY_MAGIC: &[u8; 6] = b"\x93NUMPY";
pub const NPY_EXTENSION: &str = ".npy";

/// Header + data start on this boundary (numpy moved from 16 to 64)
pub const NPY_ARRAY_ALIGN: usize = 64;

/// Magic, major/minor version and the 16-bit header length
const PREAMBLE_LEN: usize = NPY_MAGIC.len() + 2 + 2;

/// Description of one array payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpyHeader {
    descr: String,
    element_width: usize,
    shape: Vec<usize>,
}

impl NpyHeader {
    pub fn new(kind: ElementKind, shape: &[usize]) -> Result<Self> {
        Self::with_descr(kind.descr(), kind.width(), shape)
    }

    /// Header for an arbitrary type descriptor such as `"<f2"`
    pub fn with_descr(descr: &str, element_width: usize, shape: &[usize]) -> Result<Self> {
        if shape.is_empty() {
            return Err(ArchiveError::EmptyShape.into());
        }
        Ok(Self {
            descr: descr.to_string(),
            element_width,
            shape: shape.to_vec(),
        })
    }

    pub fn descr(&self) -> &str {
        &self.descr
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of data bytes the shape describes, `None` on overflow
    pub fn data_len(&self) -> Option<u64> {
        self.shape
            .iter()
            .try_fold(self.element_width as u64, |acc, &dim| acc.checked_mul(dim as u64))
    }

    /// The Python dict literal, without padding
    pub fn dictionary(&self) -> String {
        let mut dict = format!(
            "{{'descr': '{}', 'fortran_order': False, 'shape': (",
            self.descr
        );
        let dims: Vec<String> = self.shape.iter().map(ToString::to_string).collect();
        dict.push_str(&dims.join(","));
        // one-element tuple
        if self.shape.len() == 1 {
            dict.push(',');
        }
        dict.push_str(")}");
        dict
    }

    /// Serialize the full version 1.0 header.
    ///
    /// The dictionary is padded with spaces and a final newline so that the
    /// whole header is a multiple of [`NPY_ARRAY_ALIGN`] bytes. Like numpy,
    /// the padding is never empty: an already aligned dictionary gets a full
    /// extra block.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let dict = self.dictionary();
        let unpadded = PREAMBLE_LEN + dict.len() + 1;
        let total = unpadded + NPY_ARRAY_ALIGN - unpadded % NPY_ARRAY_ALIGN;

        let header_len =
            u16::try_from(total - PREAMBLE_LEN).map_err(|_| ArchiveError::HeaderTooLong(total))?;

        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(NPY_MAGIC);
        out.push(1);
        out.push(0);
        out.write_u16::<LittleEndian>(header_len)?;
        out.extend_from_slice(dict.as_bytes());
        out.resize(total - 1, b' ');
        out.push(b'\n');
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_dimension_has_trailing_comma() {
        let header = NpyHeader::new(ElementKind::F64, &[5]).unwrap();
        assert_eq!(
            header.dictionary(),
            "{'descr': '<f8', 'fortran_order': False, 'shape': (5,)}"
        );
    }

    #[test]
    fn two_dimensions() {
        let header = NpyHeader::new(ElementKind::F32, &[3, 2]).unwrap();
        assert_eq!(
            header.dictionary(),
            "{'descr': '<f4', 'fortran_order': False, 'shape': (3,2)}"
        );
        assert_eq!(header.data_len(), Some(24));

        let bytes = header.to_bytes().unwrap();
        // 10 + 56 + newline = 67, padded to 128
        assert_eq!(bytes.len(), 128);
        assert_eq!(&bytes[0..8], b"\x93NUMPY\x01\x00");
        assert_eq!(u16::from_le_bytes([bytes[8], bytes[9]]), 118);
        assert_eq!(bytes[127], b'\n');
        assert!(bytes[66..127].iter().all(|&b| b == b' '));
    }

    #[test]
    fn three_dimensions_are_comma_separated() {
        let header = NpyHeader::new(ElementKind::U8, &[2, 0, 10]).unwrap();
        assert!(header.dictionary().ends_with("'shape': (2,0,10)}"));
    }

    #[test]
    fn always_aligned() {
        for ndim in 1..40 {
            let shape: Vec<usize> = (0..ndim).map(|i| i * 7).collect();
            let bytes = NpyHeader::new(ElementKind::U16, &shape).unwrap().to_bytes().unwrap();
            assert_eq!(bytes.len() % NPY_ARRAY_ALIGN, 0);
            assert_eq!(bytes.last(), Some(&b'\n'));
            assert_eq!(bytes.iter().filter(|&&b| b == b'\n').count(), 1);
            let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
            assert_eq!(header_len + PREAMBLE_LEN, bytes.len());
        }
    }

    #[test]
    fn exactly_aligned_dictionary_gets_a_full_pad_block() {
        // 10 + 53 + newline = 64
        let header = NpyHeader::with_descr("b", 1, &[1]).unwrap();
        assert_eq!(header.dictionary().len(), 53);
        let bytes = header.to_bytes().unwrap();
        assert_eq!(bytes.len(), 128);
        assert_eq!(u16::from_le_bytes([bytes[8], bytes[9]]), 118);
    }

    #[test]
    fn rejects_empty_shape() {
        let err = NpyHeader::new(ElementKind::I32, &[]).unwrap_err();
        assert_eq!(err.downcast_ref::<ArchiveError>(), Some(&ArchiveError::EmptyShape));
    }

    #[test]
    fn rejects_headers_beyond_version_one() {
        let shape = vec![1usize; 40_000];
        let err = NpyHeader::new(ElementKind::U8, &shape).unwrap().to_bytes().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ArchiveError>(),
            Some(ArchiveError::HeaderTooLong(_))
        ));
    }

    #[test]
    fn data_len_overflow() {
        let header = NpyHeader::new(ElementKind::F64, &[usize::MAX, 2]).unwrap();
        assert_eq!(header.data_len(), None);
    }
}
