//! Error types for cellscope-core.

use thiserror::Error;

/// Result type alias for cellscope operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for cellscope operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Unrecognised centering symbol.
    #[error("invalid centering symbol: {0:?}")]
    InvalidCentering(String),

    /// Unrecognised lattice type name.
    #[error("invalid lattice type: {0:?}")]
    InvalidLatticeType(String),

    /// Unrecognised unique axis label.
    #[error("invalid unique axis: {0:?}")]
    InvalidUniqueAxis(String),

    /// Unrecognised cell parameter name.
    #[error("invalid cell parameter: {0:?}")]
    InvalidCellParameter(String),

    /// Geometry error.
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),
}

/// Errors raised while interpreting a detector geometry description.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A required per-panel or per-region field is absent.
    #[error("{name}: missing geometry field `{field}`")]
    MissingField { name: String, field: &'static str },

    /// A field value could not be interpreted.
    #[error("{name}: invalid value {value:?} for `{field}`")]
    InvalidValue {
        name: String,
        field: String,
        value: String,
    },

    /// The direction vectors match none of the supported orientations.
    #[error(
        "panel {name}: unrecognised orientation (fs = {xfs}x {yfs}y, ss = {xss}x {yss}y)"
    )]
    UnknownOrientation {
        name: String,
        xfs: f64,
        yfs: f64,
        xss: f64,
        yss: f64,
    },

    /// Panel pixel bounds are inverted or exceed the source image.
    #[error("panel {name}: pixel bounds fs {min_fs}..={max_fs}, ss {min_ss}..={max_ss} do not fit a {rows}x{cols} source image")]
    PanelBounds {
        name: String,
        min_fs: usize,
        max_fs: usize,
        min_ss: usize,
        max_ss: usize,
        rows: usize,
        cols: usize,
    },

    /// The geometry describes no panels.
    #[error("geometry contains no panels")]
    NoPanels,
}
