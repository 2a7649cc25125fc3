//! Panel orientation classes.
//!
//! A panel's fast-scan and slow-scan direction vectors are reduced to one of
//! four array reflections/rotations. Each variant owns the three operations
//! that must agree with each other: the pixel-block transform, the placement
//! of the transformed block in the composed image, and the permutation of
//! peak coordinates.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap
)]

use cellscope_core::{GeometryError, PanelGeometry};
use ndarray::{s, Array2, ArrayView2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a panel's pixel block maps onto the composed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Orientation {
    /// Fast scan along +X, slow scan along +Y: row order reversed.
    RowReversal,
    /// Fast scan along -X, slow scan along -Y: column order reversed.
    ColumnReversal,
    /// Slow scan along +X, fast scan along -Y: rotate 90° then flip columns.
    DiagonalRotation,
    /// Slow scan along -X, fast scan along +Y: plain transpose.
    Transpose,
}

impl Orientation {
    /// Classifies a panel from the signs and relative magnitudes of its
    /// direction vectors.
    ///
    /// # Errors
    /// Returns [`GeometryError::UnknownOrientation`] when the vectors match
    /// none of the four supported cases.
    pub fn classify(panel: &PanelGeometry) -> Result<Self, GeometryError> {
        let (xfs, yfs, xss, yss) = (panel.xfs, panel.yfs, panel.xss, panel.yss);

        let fast_along_y = xfs.abs() < xss.abs() && yfs.abs() > yss.abs();
        let fast_along_x = xfs.abs() > xss.abs() && yfs.abs() < yss.abs();

        let orientation = if fast_along_y && xss > 0.0 && yfs < 0.0 {
            Some(Orientation::DiagonalRotation)
        } else if fast_along_y && xss < 0.0 && yfs > 0.0 {
            Some(Orientation::Transpose)
        } else if fast_along_x && xfs < 0.0 && yss < 0.0 {
            Some(Orientation::ColumnReversal)
        } else if fast_along_x && xfs > 0.0 && yss > 0.0 {
            Some(Orientation::RowReversal)
        } else {
            None
        };

        orientation.ok_or_else(|| {
            log::error!("panel {}: unrecognised orientation", panel.name);
            GeometryError::UnknownOrientation {
                name: panel.name.clone(),
                xfs,
                yfs,
                xss,
                yss,
            }
        })
    }

    /// Shape `(rows, cols)` of a `(rows, cols)` block after the transform.
    #[must_use]
    pub fn oriented_shape(self, (rows, cols): (usize, usize)) -> (usize, usize) {
        match self {
            Orientation::RowReversal | Orientation::ColumnReversal => (rows, cols),
            Orientation::DiagonalRotation | Orientation::Transpose => (cols, rows),
        }
    }

    /// Applies the reflection/rotation to a pixel block.
    #[must_use]
    pub fn apply<T: Clone>(self, block: ArrayView2<'_, T>) -> Array2<T> {
        let oriented = match self {
            Orientation::RowReversal => block.slice_move(s![..;-1, ..]),
            Orientation::ColumnReversal => block.slice_move(s![.., ..;-1]),
            Orientation::DiagonalRotation => block.reversed_axes().slice_move(s![..;-1, ..;-1]),
            Orientation::Transpose => block.reversed_axes(),
        };
        oriented.as_standard_layout().into_owned()
    }

    /// Top-left `(row, col)` of the oriented block in an `image` of shape
    /// `(rows, cols)`, before any centre offset.
    ///
    /// `oriented` is the shape of the block after [`Orientation::apply`].
    #[must_use]
    pub fn placement(
        self,
        image: (usize, usize),
        corner: (f64, f64),
        oriented: (usize, usize),
    ) -> (i64, i64) {
        let (image_rows, image_cols) = image;
        let (corner_x, corner_y) = corner;
        let (rows, cols) = (oriented.0 as f64, oriented.1 as f64);
        let half_rows = image_rows as f64 / 2.0;
        let half_cols = image_cols as f64 / 2.0;

        match self {
            Orientation::RowReversal => (
                (half_rows - corner_y - rows).round_ties_even() as i64,
                (half_cols + corner_x).round_ties_even() as i64,
            ),
            Orientation::ColumnReversal => (
                (image_rows / 2) as i64 - corner_y.floor() as i64,
                (image_cols / 2) as i64 + corner_x.floor() as i64 - oriented.1 as i64,
            ),
            Orientation::DiagonalRotation => (
                (half_rows - corner_y - rows).round_ties_even() as i64,
                (half_cols + corner_x - cols).round_ties_even() as i64,
            ),
            Orientation::Transpose => (
                (half_rows - corner_y).round_ties_even() as i64,
                (half_cols + corner_x).round_ties_even() as i64,
            ),
        }
    }

    /// Maps a panel-relative `(row, col)` into the oriented block.
    #[must_use]
    pub fn permute(self, (row, col): (f64, f64), oriented: (usize, usize)) -> (f64, f64) {
        let last_row = oriented.0 as f64 - 1.0;
        let last_col = oriented.1 as f64 - 1.0;
        match self {
            Orientation::RowReversal => (last_row - row, col),
            Orientation::ColumnReversal => (row, last_col - col),
            Orientation::DiagonalRotation => (last_row - col, last_col - row),
            Orientation::Transpose => (col, row),
        }
    }

    /// Inverse of [`Orientation::permute`].
    #[must_use]
    pub fn unpermute(self, (row, col): (f64, f64), oriented: (usize, usize)) -> (f64, f64) {
        let last_row = oriented.0 as f64 - 1.0;
        let last_col = oriented.1 as f64 - 1.0;
        match self {
            Orientation::RowReversal => (last_row - row, col),
            Orientation::ColumnReversal => (row, last_col - col),
            Orientation::DiagonalRotation => (last_col - col, last_row - row),
            Orientation::Transpose => (col, row),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn geometry(xfs: f64, yfs: f64, xss: f64, yss: f64) -> PanelGeometry {
        PanelGeometry {
            name: "q0a0".into(),
            min_fs: 0,
            min_ss: 0,
            max_fs: 2,
            max_ss: 1,
            xfs,
            yfs,
            xss,
            yss,
            corner_x: 0.0,
            corner_y: 0.0,
        }
    }

    #[test]
    fn test_classify_each_branch() {
        let cases = [
            ((0.0, -1.0, 1.0, 0.0), Orientation::DiagonalRotation),
            ((0.0, 1.0, -1.0, 0.0), Orientation::Transpose),
            ((-1.0, 0.0, 0.0, -1.0), Orientation::ColumnReversal),
            ((1.0, 0.0, 0.0, 1.0), Orientation::RowReversal),
            ((0.004, -0.99998, 0.99998, 0.004), Orientation::DiagonalRotation),
        ];
        for ((xfs, yfs, xss, yss), expected) in cases {
            assert_eq!(
                Orientation::classify(&geometry(xfs, yfs, xss, yss)).unwrap(),
                expected
            );
        }
    }

    #[test]
    fn test_classify_rejects_degenerate_vectors() {
        // Fast along +X but slow along -Y is not a supported layout.
        let err = Orientation::classify(&geometry(1.0, 0.0, 0.0, -1.0)).unwrap_err();
        assert!(matches!(err, GeometryError::UnknownOrientation { ref name, .. } if name == "q0a0"));

        // Diagonal vectors have no dominant axis.
        assert!(Orientation::classify(&geometry(0.7071, 0.7071, -0.7071, 0.7071)).is_err());
    }

    #[test]
    fn test_apply_transforms() {
        let block = array![[1, 2, 3], [4, 5, 6]];

        assert_eq!(
            Orientation::RowReversal.apply(block.view()),
            array![[4, 5, 6], [1, 2, 3]]
        );
        assert_eq!(
            Orientation::ColumnReversal.apply(block.view()),
            array![[3, 2, 1], [6, 5, 4]]
        );
        assert_eq!(
            Orientation::Transpose.apply(block.view()),
            array![[1, 4], [2, 5], [3, 6]]
        );
        assert_eq!(
            Orientation::DiagonalRotation.apply(block.view()),
            array![[6, 3], [5, 2], [4, 1]]
        );
    }

    #[test]
    fn test_permute_matches_array_transform() {
        let block = array![[1, 2, 3], [4, 5, 6]];
        for orientation in [
            Orientation::RowReversal,
            Orientation::ColumnReversal,
            Orientation::DiagonalRotation,
            Orientation::Transpose,
        ] {
            let oriented = orientation.apply(block.view());
            let shape = oriented.dim();
            for ((row, col), value) in block.indexed_iter() {
                let (r, c) = orientation.permute((row as f64, col as f64), shape);
                assert_eq!(oriented[[r as usize, c as usize]], *value, "{orientation:?}");
            }
        }
    }

    #[test]
    fn test_placement_formulas() {
        let image = (100, 100);
        // Block of 10 rows x 20 cols after transform.
        assert_eq!(
            Orientation::RowReversal.placement(image, (-10.0, 30.0), (10, 20)),
            (10, 40)
        );
        assert_eq!(
            Orientation::ColumnReversal.placement(image, (10.7, -5.2), (10, 20)),
            (56, 40)
        );
        assert_eq!(
            Orientation::DiagonalRotation.placement(image, (25.0, 15.0), (20, 10)),
            (15, 65)
        );
        assert_eq!(
            Orientation::Transpose.placement(image, (-30.0, -2.0), (20, 10)),
            (52, 20)
        );
        // Ties round to even.
        assert_eq!(
            Orientation::Transpose.placement(image, (0.5, 0.5), (20, 10)),
            (50, 50)
        );
    }
}
