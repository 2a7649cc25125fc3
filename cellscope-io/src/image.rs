//! Memory-mapped raw detector images.
//!
//! A raw image is a headerless little-endian `f32` array in row-major order,
//! laid out as the detector's source image (`ss` rows by `fs` columns).

use crate::{Error, Result};
use memmap2::Mmap;
use ndarray::Array2;
use std::fs::File;
use std::path::{Path, PathBuf};

const PIXEL_BYTES: usize = std::mem::size_of::<f32>();

/// Reader for headerless `f32` detector images.
pub struct RawImageReader {
    mmap: Mmap,
    path: PathBuf,
}

impl RawImageReader {
    /// Opens a raw image for memory-mapped reading.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        // SAFETY: The file is opened read-only and we assume it is not modified concurrently.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self {
            mmap,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Number of pixels in the file.
    #[must_use]
    pub fn pixels(&self) -> usize {
        self.mmap.len() / PIXEL_BYTES
    }

    /// Decodes the image as `rows x cols`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFormat`] if the file size does not match the
    /// requested shape.
    pub fn read(&self, rows: usize, cols: usize) -> Result<Array2<f32>> {
        let expected = rows * cols * PIXEL_BYTES;
        if self.mmap.len() != expected {
            return Err(Error::InvalidFormat(format!(
                "{}: {} bytes, expected {expected} for a {rows}x{cols} f32 image",
                self.path.display(),
                self.mmap.len()
            )));
        }

        let pixels: Vec<f32> = self
            .mmap
            .chunks_exact(PIXEL_BYTES)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        log::debug!("read {rows}x{cols} image from {}", self.path.display());
        Array2::from_shape_vec((rows, cols), pixels)
            .map_err(|e| Error::InvalidFormat(e.to_string()))
    }
}
