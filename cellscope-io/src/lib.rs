//! cellscope-io: File I/O for cellscope.
//!
//! This crate reads CrystFEL geometry and stream files, memory-maps raw
//! detector images via memmap2, and writes unit-cell files and composed
//! images.
//!

mod error;
pub mod geometry;
mod image;
pub mod stream;
mod writer;

pub use error::{Error, Result};
pub use geometry::{parse_direction, parse_geometry, read_geometry};
pub use image::RawImageReader;
pub use stream::{cell_from_reciprocal, read_stream, Chunk, CrystalRecord, IndexedCrystal, StreamFile};
pub use writer::{format_unit_cell, ImageWriter, UnitCellWriter, UNIT_CELL_FILE};
