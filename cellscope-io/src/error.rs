//! I/O error types.

use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid file format.
    #[error("invalid file format: {0}")]
    InvalidFormat(String),

    /// Syntax error on a specific line.
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// Geometry error.
    #[error("geometry error: {0}")]
    Geometry(#[from] cellscope_core::GeometryError),
}
