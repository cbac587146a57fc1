//! NumPy `.npy` array payloads.
//!
//! An `.npy` file is a padded text header describing element type, shape and
//! memory order, followed by the raw elements. Inside an `.npz` archive every
//! array is one such file. This module builds the header ([`NpyHeader`]) and
//! maps Rust element types to NumPy type descriptors ([`ElementKind`],
//! [`Element`]).
//!
//! Only version 1.0 headers are produced: the header length must fit in 16
//! bits. Data is always little-endian and row-major (`fortran_order: False`).

mod element;
mod header;

pub use element::{Element, ElementKind};
pub use header::{NPY_ARRAY_ALIGN, NPY_EXTENSION, NPY_MAGIC, NpyHeader};
