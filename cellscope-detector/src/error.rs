//! Detector composition error types.

use cellscope_core::GeometryError;
use thiserror::Error;

/// Result type for detector operations.
pub type Result<T> = std::result::Result<T, DetectorError>;

/// Errors that abort a detector image build.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectorError {
    /// Invalid or unsupported geometry.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// A panel or bad region does not fit the composed image at its computed position.
    #[error("wrong panel position: {name} at (row {row}, col {col}) with shape {rows}x{cols} exceeds the {image_rows}x{image_cols} image")]
    Placement {
        /// Panel or bad-region name.
        name: String,
        /// Computed top row.
        row: i64,
        /// Computed left column.
        col: i64,
        /// Rows of the array being placed.
        rows: usize,
        /// Columns of the array being placed.
        cols: usize,
        /// Rows of the composed image.
        image_rows: usize,
        /// Columns of the composed image.
        image_cols: usize,
    },
}
