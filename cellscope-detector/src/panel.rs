//! Panel reconstruction: orientation, placement and peak remapping.
#![allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]

use crate::{Orientation, Result};
use cellscope_core::{GeometryError, PanelGeometry, PeakRecord};
use ndarray::{s, Array2, ArrayView2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integer displacement of the beam centre in the composed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CenterOffset {
    /// Added to every placement column.
    pub x: i64,
    /// Added to every placement row.
    pub y: i64,
}

impl CenterOffset {
    /// Creates a centre offset.
    #[must_use]
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// One detector tile with its raw pixel block and attached peaks.
#[derive(Debug, Clone)]
pub struct Panel {
    geometry: PanelGeometry,
    data: Array2<f32>,
    peaks: Vec<PeakRecord>,
}

impl Panel {
    /// Slices a panel's pixel block out of the raw source image.
    ///
    /// # Errors
    /// Returns [`GeometryError::PanelBounds`] if the bounds are inverted or
    /// fall outside `source`.
    pub fn from_source(
        geometry: PanelGeometry,
        source: ArrayView2<'_, f32>,
    ) -> std::result::Result<Self, GeometryError> {
        let (rows, cols) = source.dim();
        if geometry.min_fs > geometry.max_fs
            || geometry.min_ss > geometry.max_ss
            || geometry.max_ss >= rows
            || geometry.max_fs >= cols
        {
            return Err(bounds_error(&geometry, (rows, cols)));
        }
        let data = source
            .slice(s![
                geometry.min_ss..=geometry.max_ss,
                geometry.min_fs..=geometry.max_fs
            ])
            .to_owned();
        Ok(Self {
            geometry,
            data,
            peaks: Vec::new(),
        })
    }

    /// Attaches peak records to this panel.
    #[must_use]
    pub fn with_peaks(mut self, peaks: Vec<PeakRecord>) -> Self {
        self.peaks = peaks;
        self
    }

    /// Panel name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.geometry.name
    }

    /// Raw pixel block, rows along slow scan.
    #[must_use]
    pub fn data(&self) -> &Array2<f32> {
        &self.data
    }

    /// Attached peaks in raw-image coordinates.
    #[must_use]
    pub fn peaks(&self) -> &[PeakRecord] {
        &self.peaks
    }

    /// Resolves the panel's orientation and its placement in a composed image
    /// of shape `image_size` (rows, cols), remapping every attached peak.
    ///
    /// # Errors
    /// Returns a geometry error if the direction vectors match no orientation.
    pub fn resolve(&self, image_size: (usize, usize), center: CenterOffset) -> Result<ResolvedPanel> {
        let orientation = Orientation::classify(&self.geometry)?;
        let data = orientation.apply(self.data.view());
        let (rows, cols) = data.dim();

        let (row, col) = orientation.placement(
            image_size,
            (self.geometry.corner_x, self.geometry.corner_y),
            (rows, cols),
        );

        let layout = PanelLayout {
            name: self.geometry.name.clone(),
            orientation,
            row: row + center.y,
            col: col + center.x,
            rows,
            cols,
            min_fs: self.geometry.min_fs,
            min_ss: self.geometry.min_ss,
        };

        let peaks = self.peaks.iter().map(|peak| layout.remap(peak)).collect();

        log::debug!(
            "panel {}: {:?} placed at ({}, {})",
            layout.name,
            orientation,
            layout.row,
            layout.col
        );

        Ok(ResolvedPanel {
            layout,
            data,
            peaks,
        })
    }
}

fn bounds_error(geometry: &PanelGeometry, (rows, cols): (usize, usize)) -> GeometryError {
    GeometryError::PanelBounds {
        name: geometry.name.clone(),
        min_fs: geometry.min_fs,
        max_fs: geometry.max_fs,
        min_ss: geometry.min_ss,
        max_ss: geometry.max_ss,
        rows,
        cols,
    }
}

/// Where and how a resolved panel sits in the composed image.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanelLayout {
    /// Panel name.
    pub name: String,
    /// Resolved orientation class.
    pub orientation: Orientation,
    /// Top row in the composed image, centre offset included.
    pub row: i64,
    /// Left column in the composed image, centre offset included.
    pub col: i64,
    /// Rows of the oriented block.
    pub rows: usize,
    /// Columns of the oriented block.
    pub cols: usize,
    /// First fast-scan pixel of the panel in the raw image.
    pub min_fs: usize,
    /// First slow-scan pixel of the panel in the raw image.
    pub min_ss: usize,
}

impl PanelLayout {
    /// Maps raw-image `(fs, ss)` on this panel to composed-image `(x, y)`.
    #[must_use]
    pub fn to_composed(&self, fs: f64, ss: f64) -> (f64, f64) {
        let local = (ss - self.min_ss as f64, fs - self.min_fs as f64);
        let (row, col) = self.orientation.permute(local, (self.rows, self.cols));
        (self.col as f64 + col, self.row as f64 + row)
    }

    /// Maps composed-image `(x, y)` back to raw-image `(fs, ss)`.
    #[must_use]
    pub fn to_local(&self, x: f64, y: f64) -> (f64, f64) {
        let oriented = (y - self.row as f64, x - self.col as f64);
        let (row, col) = self.orientation.unpermute(oriented, (self.rows, self.cols));
        (col + self.min_fs as f64, row + self.min_ss as f64)
    }

    /// True if composed-image pixel `(x, y)` lies on this panel.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let (x0, y0) = (self.col as f64, self.row as f64);
        x >= x0 && y >= y0 && x < x0 + self.cols as f64 && y < y0 + self.rows as f64
    }

    /// Returns a copy of `peak` positioned in the composed image.
    #[must_use]
    pub fn remap(&self, peak: &PeakRecord) -> PeakRecord {
        let (x, y) = self.to_composed(peak.fs, peak.ss);
        peak.with_position(x, y)
    }
}

/// A panel after orientation resolution.
#[derive(Debug, Clone)]
pub struct ResolvedPanel {
    /// Placement and orientation.
    pub layout: PanelLayout,
    /// Oriented pixel block.
    pub data: Array2<f32>,
    /// Attached peaks with `position` set.
    pub peaks: Vec<PeakRecord>,
}
