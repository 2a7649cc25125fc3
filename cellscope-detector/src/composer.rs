//! Detector image assembly.
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]

use crate::bad_region::{map_bad_region, BadRegionRect};
use crate::orientation::Orientation;
use crate::panel::{CenterOffset, Panel, PanelLayout, ResolvedPanel};
use crate::{DetectorError, Result};
use cellscope_core::{DetectorGeometry, GeometryError, PeakRecord};
use ndarray::{s, Array2, ArrayView2};
use rayon::prelude::*;
use std::collections::HashMap;

/// Configuration for detector image assembly.
#[derive(Debug, Clone, Default)]
pub struct ComposeConfig {
    /// Composed image shape `(rows, cols)`; fitted to the panel placements when `None`.
    pub image_size: Option<(usize, usize)>,
    /// Beam-centre displacement applied to every panel.
    pub center: CenterOffset,
}

impl ComposeConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an explicit composed image shape.
    #[must_use]
    pub fn with_image_size(mut self, rows: usize, cols: usize) -> Self {
        self.image_size = Some((rows, cols));
        self
    }

    /// Sets the beam-centre displacement.
    #[must_use]
    pub fn with_center(mut self, center: CenterOffset) -> Self {
        self.center = center;
        self
    }
}

/// A fully assembled detector image.
#[derive(Debug, Clone)]
pub struct ComposedImage {
    /// Pixel values, row 0 at the top.
    pub data: Array2<f32>,
    /// Panel placements in geometry order.
    pub panels: Vec<PanelLayout>,
    /// Bad regions as painted.
    pub bad_regions: Vec<BadRegionRect>,
    /// All peaks with composed-image positions.
    pub peaks: Vec<PeakRecord>,
}

impl ComposedImage {
    /// Finds the panel under composed-image pixel `(x, y)` and the raw
    /// `(fs, ss)` coordinates there. Later panels win on overlap.
    #[must_use]
    pub fn locate(&self, x: f64, y: f64) -> Option<(&str, f64, f64)> {
        self.panels
            .iter()
            .rev()
            .find(|layout| layout.contains(x, y))
            .map(|layout| {
                let (fs, ss) = layout.to_local(x, y);
                (layout.name.as_str(), fs, ss)
            })
    }
}

/// Assembles detector images for one geometry.
#[derive(Debug, Clone)]
pub struct ImageComposer {
    geometry: DetectorGeometry,
    config: ComposeConfig,
    image_size: (usize, usize),
}

impl ImageComposer {
    /// Creates a composer.
    ///
    /// # Errors
    /// Returns [`GeometryError::NoPanels`] for an empty geometry, and
    /// [`GeometryError::UnknownOrientation`] when the image size has to be
    /// fitted to a panel with unsupported direction vectors.
    pub fn new(geometry: DetectorGeometry, config: ComposeConfig) -> Result<Self> {
        if geometry.panels.is_empty() {
            return Err(GeometryError::NoPanels.into());
        }
        let image_size = match config.image_size {
            Some(size) => size,
            None => fitted_size(&geometry, config.center)?,
        };
        Ok(Self {
            geometry,
            config,
            image_size,
        })
    }

    /// The detector geometry.
    #[must_use]
    pub fn geometry(&self) -> &DetectorGeometry {
        &self.geometry
    }

    /// Shape `(rows, cols)` of the composed image.
    #[must_use]
    pub fn image_size(&self) -> (usize, usize) {
        self.image_size
    }

    /// Builds the composed image from a raw source image and the peaks found
    /// on it. Peaks naming an unknown panel are dropped with a warning.
    ///
    /// # Errors
    /// Any geometry or placement error aborts the whole build.
    pub fn compose(&self, source: ArrayView2<'_, f32>, peaks: &[PeakRecord]) -> Result<ComposedImage> {
        let image_size = self.image_size();

        let mut by_panel: HashMap<&str, Vec<PeakRecord>> = HashMap::new();
        for peak in peaks {
            if self.geometry.panel(&peak.panel).is_some() {
                by_panel.entry(peak.panel.as_str()).or_default().push(peak.clone());
            } else {
                log::warn!(
                    "peak at fs={}, ss={} names unknown panel {:?}",
                    peak.fs,
                    peak.ss,
                    peak.panel
                );
            }
        }

        let panels = self
            .geometry
            .panels
            .iter()
            .map(|geometry| {
                let peaks = by_panel.remove(geometry.name.as_str()).unwrap_or_default();
                Panel::from_source(geometry.clone(), source).map(|panel| panel.with_peaks(peaks))
            })
            .collect::<std::result::Result<Vec<_>, GeometryError>>()?;

        let resolved = panels
            .par_iter()
            .map(|panel| panel.resolve(image_size, self.config.center))
            .collect::<Result<Vec<_>>>()?;

        let mut data = Array2::<f32>::zeros(image_size);
        let mut layouts = Vec::with_capacity(resolved.len());
        let mut composed_peaks = Vec::new();
        for ResolvedPanel {
            layout,
            data: block,
            peaks,
        } in resolved
        {
            place(&mut data, &layout.name, layout.row, layout.col, &block)?;
            composed_peaks.extend(peaks);
            layouts.push(layout);
        }

        let mut bad_regions = Vec::with_capacity(self.geometry.bad_regions.len());
        for region in &self.geometry.bad_regions {
            let rect = map_bad_region(region, image_size);
            if !rect.is_empty() {
                place(&mut data, &rect.name, rect.max_y, rect.min_x, &rect.mask)?;
            }
            bad_regions.push(rect);
        }

        log::debug!(
            "composed {}x{} image from {} panels, {} bad regions, {} peaks",
            image_size.0,
            image_size.1,
            layouts.len(),
            bad_regions.len(),
            composed_peaks.len()
        );

        Ok(ComposedImage {
            data,
            panels: layouts,
            bad_regions,
            peaks: composed_peaks,
        })
    }
}

/// Smallest square shape that holds every panel where its orientation
/// places it.
///
/// Placements are computed relative to the image centre. With an even
/// half-size `h` the placement in a `2h x 2h` image is exactly `h` plus the
/// centre-relative one, since shifting by an even integer preserves both
/// floor and round-half-to-even.
fn fitted_size(
    geometry: &DetectorGeometry,
    center: CenterOffset,
) -> std::result::Result<(usize, usize), GeometryError> {
    let mut half: i64 = 1;
    for panel in &geometry.panels {
        let orientation = Orientation::classify(panel)?;
        let (rows, cols) = orientation.oriented_shape((panel.height(), panel.width()));
        let (row, col) = orientation.placement((0, 0), (panel.corner_x, panel.corner_y), (rows, cols));
        let (row, col) = (row + center.y, col + center.x);
        half = half
            .max(-row)
            .max(row + rows as i64)
            .max(-col)
            .max(col + cols as i64);
    }
    let half = (half + 1) / 2 * 2;
    let side = 2 * half as usize;
    log::debug!("fitted composed image size {side}x{side}");
    Ok((side, side))
}

/// Writes `block` into `image` with its top-left corner at `(row, col)`.
fn place(image: &mut Array2<f32>, name: &str, row: i64, col: i64, block: &Array2<f32>) -> Result<()> {
    let (image_rows, image_cols) = image.dim();
    let (rows, cols) = block.dim();
    let fits = row >= 0
        && col >= 0
        && row + rows as i64 <= image_rows as i64
        && col + cols as i64 <= image_cols as i64;
    if !fits {
        log::error!("wrong panel position: {name} at ({row}, {col})");
        return Err(DetectorError::Placement {
            name: name.to_string(),
            row,
            col,
            rows,
            cols,
            image_rows,
            image_cols,
        });
    }
    let (row, col) = (row as usize, col as usize);
    image
        .slice_mut(s![row..row + rows, col..col + cols])
        .assign(block);
    Ok(())
}
