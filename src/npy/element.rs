use byteorder::{ByteOrder, LittleEndian};

/// Element types that can be stored in an `.npy` payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// Single-byte character string (`S1`)
    Char,
    /// Pair of `f32` (real, imaginary)
    Complex64,
    /// Pair of `f64` (real, imaginary)
    Complex128,
}

impl ElementKind {
    /// NumPy type descriptor and element width in bytes.
    ///
    /// Single-byte types use `|` since byte order does not apply to them.
    const fn layout(self) -> (&'static str, usize) {
        match self {
            ElementKind::I8 => ("|i1", 1),
            ElementKind::I16 => ("<i2", 2),
            ElementKind::I32 => ("<i4", 4),
            ElementKind::I64 => ("<i8", 8),
            ElementKind::U8 => ("|u1", 1),
            ElementKind::U16 => ("<u2", 2),
            ElementKind::U32 => ("<u4", 4),
            ElementKind::U64 => ("<u8", 8),
            ElementKind::F32 => ("<f4", 4),
            ElementKind::F64 => ("<f8", 8),
            ElementKind::Char => ("|S1", 1),
            ElementKind::Complex64 => ("<c8", 8),
            ElementKind::Complex128 => ("<c16", 16),
        }
    }

    pub const fn descr(self) -> &'static str {
        self.layout().0
    }

    pub const fn width(self) -> usize {
        self.layout().1
    }
}

/// Rust types with a fixed NumPy element kind.
///
/// Complex numbers are `[re, im]` pairs.
pub trait Element: Copy {
    const KIND: ElementKind;

    /// Serialize `values` as contiguous little-endian elements
    fn to_le_vec(values: &[Self]) -> Vec<u8>;
}

impl Element for i8 {
    const KIND: ElementKind = ElementKind::I8;

    fn to_le_vec(values: &[Self]) -> Vec<u8> {
        values.iter().map(|&v| v as u8).collect()
    }
}

impl Element for u8 {
    const KIND: ElementKind = ElementKind::U8;

    fn to_le_vec(values: &[Self]) -> Vec<u8> {
        values.to_vec()
    }
}

macro_rules! impl_element {
    ($ty:ty, $kind:expr, $write:ident) => {
        impl Element for $ty {
            const KIND: ElementKind = $kind;

            fn to_le_vec(values: &[Self]) -> Vec<u8> {
                let mut out = vec![0u8; values.len() * Self::KIND.width()];
                LittleEndian::$write(values, &mut out);
                out
            }
        }
    };
}

impl_element!(i16, ElementKind::I16, write_i16_into);
impl_element!(i32, ElementKind::I32, write_i32_into);
impl_element!(i64, ElementKind::I64, write_i64_into);
impl_element!(u16, ElementKind::U16, write_u16_into);
impl_element!(u32, ElementKind::U32, write_u32_into);
impl_element!(u64, ElementKind::U64, write_u64_into);
impl_element!(f32, ElementKind::F32, write_f32_into);
impl_element!(f64, ElementKind::F64, write_f64_into);

impl Element for [f32; 2] {
    const KIND: ElementKind = ElementKind::Complex64;

    fn to_le_vec(values: &[Self]) -> Vec<u8> {
        <f32 as Element>::to_le_vec(values.as_flattened())
    }
}

impl Element for [f64; 2] {
    const KIND: ElementKind = ElementKind::Complex128;

    fn to_le_vec(values: &[Self]) -> Vec<u8> {
        <f64 as Element>::to_le_vec(values.as_flattened())
    }
}
