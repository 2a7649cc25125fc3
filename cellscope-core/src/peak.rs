//! Peak records attached to detector panels.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What produced a peak record.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PeakKind {
    /// Found by the peak search, with its resolution in nm^-1.
    Search { resolution: f64 },
    /// Predicted reflection measured after indexing.
    Reflection {
        h: i32,
        k: i32,
        l: i32,
        sigma: f64,
        peak: f64,
        background: f64,
    },
}

/// A located peak.
///
/// Records are immutable: remapping into the composed image produces a new
/// record with `position` set.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PeakRecord {
    /// Fast-scan coordinate in the raw source image.
    pub fs: f64,
    /// Slow-scan coordinate in the raw source image.
    pub ss: f64,
    /// Integrated intensity.
    pub intensity: f64,
    /// Name of the panel the peak lies on.
    pub panel: String,
    pub kind: PeakKind,
    /// `(x, y)` in the composed image, `None` until remapped.
    pub position: Option<(f64, f64)>,
}

impl PeakRecord {
    /// Creates a peak-search record.
    pub fn search(fs: f64, ss: f64, resolution: f64, intensity: f64, panel: impl Into<String>) -> Self {
        Self {
            fs,
            ss,
            intensity,
            panel: panel.into(),
            kind: PeakKind::Search { resolution },
            position: None,
        }
    }

    /// Creates a post-indexing reflection record.
    #[allow(clippy::too_many_arguments)]
    pub fn reflection(
        (h, k, l): (i32, i32, i32),
        intensity: f64,
        sigma: f64,
        peak: f64,
        background: f64,
        fs: f64,
        ss: f64,
        panel: impl Into<String>,
    ) -> Self {
        Self {
            fs,
            ss,
            intensity,
            panel: panel.into(),
            kind: PeakKind::Reflection {
                h,
                k,
                l,
                sigma,
                peak,
                background,
            },
            position: None,
        }
    }

    /// Returns a copy of this record placed at `(x, y)` in the composed image.
    #[must_use]
    pub fn with_position(&self, x: f64, y: f64) -> Self {
        Self {
            position: Some((x, y)),
            ..self.clone()
        }
    }

    /// True for post-indexing reflections.
    #[must_use]
    pub fn is_reflection(&self) -> bool {
        matches!(self.kind, PeakKind::Reflection { .. })
    }
}
