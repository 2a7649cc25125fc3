//! Mapping of bad regions into composed-image pixels.
#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_possible_wrap)]

use cellscope_core::BadRegion;
use ndarray::Array2;
use std::ops::Range;

/// A bad region in composed-image pixels.
///
/// Y is flipped relative to geometry units, so the region covers rows
/// `max_y..min_y` and columns `min_x..max_x`.
#[derive(Debug, Clone, PartialEq)]
pub struct BadRegionRect {
    /// Region name.
    pub name: String,
    /// Left column, clamped to `>= 0`.
    pub min_x: i64,
    /// Right column (exclusive), clamped to `<= cols - 1`.
    pub max_x: i64,
    /// Bottom row (exclusive), clamped to `<= rows - 1`.
    pub min_y: i64,
    /// Top row, clamped to `>= 0`.
    pub max_y: i64,
    /// Zero-filled mask covering the rectangle.
    pub mask: Array2<f32>,
}

impl BadRegionRect {
    /// Row range covered by the mask.
    #[must_use]
    pub fn rows(&self) -> Range<i64> {
        self.max_y..self.max_y + self.mask.nrows() as i64
    }

    /// Column range covered by the mask.
    #[must_use]
    pub fn cols(&self) -> Range<i64> {
        self.min_x..self.min_x + self.mask.ncols() as i64
    }

    /// True if the mask covers no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }
}

/// Converts a bad region from geometry units into clamped composed-image
/// bounds for an image of shape `(rows, cols)`.
#[must_use]
pub fn map_bad_region(region: &BadRegion, (rows, cols): (usize, usize)) -> BadRegionRect {
    let half_rows = rows as f64 / 2.0;
    let half_cols = cols as f64 / 2.0;
    let last_row = rows as i64 - 1;
    let last_col = cols as i64 - 1;

    let min_x = ((region.min_x + half_cols).round_ties_even() as i64).max(0);
    let max_x = ((region.max_x + half_cols).round_ties_even() as i64).min(last_col);
    let min_y = ((-region.min_y + half_rows).round_ties_even() as i64).min(last_row);
    let max_y = ((-region.max_y + half_rows).round_ties_even() as i64).max(0);

    let height = usize::try_from(min_y - max_y).unwrap_or(0);
    let width = usize::try_from(max_x - min_x).unwrap_or(0);

    BadRegionRect {
        name: region.name.clone(),
        min_x,
        max_x,
        min_y,
        max_y,
        mask: Array2::zeros((height, width)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> BadRegion {
        BadRegion {
            name: "badbeamstop".into(),
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    #[test]
    fn test_maps_inside_region() {
        let rect = map_bad_region(&region(-10.0, 10.0, -5.0, 5.0), (100, 200));
        assert_eq!((rect.min_x, rect.max_x), (90, 110));
        assert_eq!((rect.min_y, rect.max_y), (55, 45));
        assert_eq!(rect.mask.dim(), (10, 20));
        assert_eq!(rect.rows(), 45..55);
        assert_eq!(rect.cols(), 90..110);
        assert!(rect.mask.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_clamps_to_boundary() {
        // Extends past the left and top edges.
        let rect = map_bad_region(&region(-500.0, 10.0, -5.0, 500.0), (100, 200));
        assert_eq!(rect.min_x, 0);
        assert_eq!(rect.max_y, 0);
        assert_eq!(rect.mask.dim(), (55, 110));

        // Extends past the right and bottom edges.
        let rect = map_bad_region(&region(0.0, 500.0, -500.0, 0.0), (100, 200));
        assert_eq!(rect.max_x, 199);
        assert_eq!(rect.min_y, 99);
        assert_eq!(rect.mask.dim(), (49, 99));
    }

    #[test]
    fn test_region_outside_image_is_empty() {
        let rect = map_bad_region(&region(-900.0, -800.0, -5.0, 5.0), (100, 200));
        assert_eq!(rect.min_x, 0);
        assert!(rect.is_empty());
    }
}
