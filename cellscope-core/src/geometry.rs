//! Detector geometry descriptors.
//!
//! Coordinates follow the geometry-file convention: the origin is the beam
//! centre, X increases to the right and Y increases upward, both in pixel
//! units.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Geometry of one physical detector tile.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanelGeometry {
    /// Panel identifier.
    pub name: String,
    /// First fast-scan pixel (inclusive).
    pub min_fs: usize,
    /// First slow-scan pixel (inclusive).
    pub min_ss: usize,
    /// Last fast-scan pixel (inclusive).
    pub max_fs: usize,
    /// Last slow-scan pixel (inclusive).
    pub max_ss: usize,
    /// X component of the fast-scan direction.
    pub xfs: f64,
    /// Y component of the fast-scan direction.
    pub yfs: f64,
    /// X component of the slow-scan direction.
    pub xss: f64,
    /// Y component of the slow-scan direction.
    pub yss: f64,
    /// X position of the panel's first pixel corner.
    pub corner_x: f64,
    /// Y position of the panel's first pixel corner.
    pub corner_y: f64,
}

impl PanelGeometry {
    /// Number of pixels along the fast-scan axis.
    #[must_use]
    pub fn width(&self) -> usize {
        self.max_fs.saturating_sub(self.min_fs) + 1
    }

    /// Number of pixels along the slow-scan axis.
    #[must_use]
    pub fn height(&self) -> usize {
        self.max_ss.saturating_sub(self.min_ss) + 1
    }
}

/// A rectangular dead area of the detector, in geometry units.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BadRegion {
    /// Region identifier.
    pub name: String,
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

/// A full detector description: panels plus bad regions.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectorGeometry {
    /// Panels in geometry-file order.
    pub panels: Vec<PanelGeometry>,
    /// Bad regions in geometry-file order.
    pub bad_regions: Vec<BadRegion>,
}

impl DetectorGeometry {
    /// Looks up a panel by name.
    #[must_use]
    pub fn panel(&self, name: &str) -> Option<&PanelGeometry> {
        self.panels.iter().find(|p| p.name == name)
    }

    /// Smallest shape `(rows, cols)` of the raw source image that holds every panel.
    #[must_use]
    pub fn source_shape(&self) -> (usize, usize) {
        let rows = self.panels.iter().map(|p| p.max_ss + 1).max().unwrap_or(0);
        let cols = self.panels.iter().map(|p| p.max_fs + 1).max().unwrap_or(0);
        (rows, cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(corner_x: f64, corner_y: f64) -> PanelGeometry {
        PanelGeometry {
            name: "p0".into(),
            min_fs: 0,
            min_ss: 0,
            max_fs: 9,
            max_ss: 4,
            xfs: 1.0,
            yfs: 0.0,
            xss: 0.0,
            yss: 1.0,
            corner_x,
            corner_y,
        }
    }

    #[test]
    fn test_panel_extent() {
        let p = panel(0.0, 0.0);
        assert_eq!(p.width(), 10);
        assert_eq!(p.height(), 5);
    }

    #[test]
    fn test_source_shape_covers_panels() {
        let mut lower = panel(4.0, -7.0);
        lower.name = "p1".into();
        lower.min_ss = 5;
        lower.max_ss = 9;
        let geometry = DetectorGeometry {
            panels: vec![panel(-20.5, 3.0), lower],
            bad_regions: Vec::new(),
        };
        assert_eq!(geometry.source_shape(), (10, 10));
        assert_eq!(geometry.panel("p0").map(|p| p.corner_x), Some(-20.5));
    }
}
