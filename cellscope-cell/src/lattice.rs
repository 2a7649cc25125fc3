//! Lattice classification from cell parameters.

use cellscope_core::{LatticeLabel, LatticeType, UniqueAxis};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerances for comparing cell parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LatticeTolerances {
    /// Absolute tolerance in degrees for angle comparisons.
    pub angle: f64,
    /// Relative tolerance for length comparisons.
    pub length: f64,
}

impl Default for LatticeTolerances {
    fn default() -> Self {
        Self {
            angle: 0.3,
            length: 0.01,
        }
    }
}

impl LatticeTolerances {
    fn angle_is(&self, angle: f64, target: f64) -> bool {
        (angle - target).abs() < self.angle
    }

    fn lengths_equal(&self, x: f64, y: f64) -> bool {
        (x - y).abs() < self.length * x.abs().max(y.abs())
    }
}

/// Classifies a cell `[a, b, c, alfa, beta, gamma]` into a lattice type and
/// unique axis.
#[must_use]
pub fn classify_lattice(cell: [f64; 6], tol: LatticeTolerances) -> LatticeLabel {
    let [a, b, c, alfa, beta, gamma] = cell;
    let right = |angle| tol.angle_is(angle, 90.0);
    let hex = |angle| tol.angle_is(angle, 120.0);

    let ab = tol.lengths_equal(a, b);
    let bc = tol.lengths_equal(b, c);
    let ac = tol.lengths_equal(a, c);

    let (lattice_type, unique_axis) = if right(alfa) && right(beta) && right(gamma) {
        if ab && bc && ac {
            (LatticeType::Cubic, UniqueAxis::None)
        } else if ab {
            (LatticeType::Tetragonal, UniqueAxis::C)
        } else if bc {
            (LatticeType::Tetragonal, UniqueAxis::A)
        } else if ac {
            (LatticeType::Tetragonal, UniqueAxis::B)
        } else {
            (LatticeType::Orthorhombic, UniqueAxis::None)
        }
    } else if right(alfa) && right(beta) && hex(gamma) {
        (LatticeType::Hexagonal, UniqueAxis::C)
    } else if hex(alfa) && right(beta) && right(gamma) {
        (LatticeType::Hexagonal, UniqueAxis::A)
    } else if right(alfa) && hex(beta) && right(gamma) {
        (LatticeType::Hexagonal, UniqueAxis::B)
    } else if right(alfa) && right(beta) {
        (LatticeType::Monoclinic, UniqueAxis::C)
    } else if right(alfa) && right(gamma) {
        (LatticeType::Monoclinic, UniqueAxis::B)
    } else if right(beta) && right(gamma) {
        (LatticeType::Monoclinic, UniqueAxis::A)
    } else if tol.angle_is(alfa, beta)
        && tol.angle_is(beta, gamma)
        && tol.angle_is(alfa, gamma)
        && ab
        && bc
        && ac
    {
        (LatticeType::Rhombohedral, UniqueAxis::None)
    } else {
        (LatticeType::Triclinic, UniqueAxis::None)
    };

    LatticeLabel::new(lattice_type, unique_axis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(cell: [f64; 6]) -> (LatticeType, UniqueAxis) {
        let label = classify_lattice(cell, LatticeTolerances::default());
        (label.lattice_type, label.unique_axis)
    }

    #[test]
    fn test_cubic() {
        assert_eq!(
            classify([5.0, 5.0, 5.0, 90.0, 90.0, 90.0]),
            (LatticeType::Cubic, UniqueAxis::None)
        );
        // Within 1% and 0.3°.
        assert_eq!(
            classify([5.0, 5.03, 4.99, 90.2, 89.8, 90.0]),
            (LatticeType::Cubic, UniqueAxis::None)
        );
    }

    #[test]
    fn test_tetragonal_unique_axis() {
        assert_eq!(
            classify([79.0, 79.0, 38.0, 90.0, 90.0, 90.0]),
            (LatticeType::Tetragonal, UniqueAxis::C)
        );
        assert_eq!(
            classify([38.0, 79.0, 79.0, 90.0, 90.0, 90.0]),
            (LatticeType::Tetragonal, UniqueAxis::A)
        );
        assert_eq!(
            classify([79.0, 38.0, 79.0, 90.0, 90.0, 90.0]),
            (LatticeType::Tetragonal, UniqueAxis::B)
        );
    }

    #[test]
    fn test_orthorhombic() {
        assert_eq!(
            classify([40.0, 50.0, 60.0, 90.0, 90.0, 90.0]),
            (LatticeType::Orthorhombic, UniqueAxis::None)
        );
    }

    #[test]
    fn test_hexagonal() {
        assert_eq!(
            classify([5.0, 5.0, 7.0, 90.0, 90.0, 120.0]),
            (LatticeType::Hexagonal, UniqueAxis::C)
        );
        assert_eq!(
            classify([7.0, 5.0, 5.0, 120.0, 90.0, 90.0]),
            (LatticeType::Hexagonal, UniqueAxis::A)
        );
        assert_eq!(
            classify([5.0, 7.0, 5.0, 90.0, 120.1, 90.0]),
            (LatticeType::Hexagonal, UniqueAxis::B)
        );
    }

    #[test]
    fn test_monoclinic() {
        assert_eq!(
            classify([5.0, 6.0, 7.0, 90.0, 90.0, 95.0]),
            (LatticeType::Monoclinic, UniqueAxis::C)
        );
        assert_eq!(
            classify([5.0, 6.0, 7.0, 90.0, 104.5, 90.0]),
            (LatticeType::Monoclinic, UniqueAxis::B)
        );
        assert_eq!(
            classify([5.0, 6.0, 7.0, 97.0, 90.0, 90.0]),
            (LatticeType::Monoclinic, UniqueAxis::A)
        );
        // One degree off is outside the angle tolerance.
        assert_ne!(
            classify([5.0, 6.0, 7.0, 91.0, 89.0, 90.0]).0,
            LatticeType::Monoclinic
        );
    }

    #[test]
    fn test_rhombohedral_and_triclinic() {
        assert_eq!(
            classify([5.0, 5.0, 5.0, 80.0, 80.1, 79.9]),
            (LatticeType::Rhombohedral, UniqueAxis::None)
        );
        assert_eq!(
            classify([5.0, 6.0, 5.0, 80.0, 80.0, 80.0]),
            (LatticeType::Triclinic, UniqueAxis::None)
        );
        assert_eq!(
            classify([5.0, 6.0, 7.0, 91.0, 89.0, 90.0]),
            (LatticeType::Triclinic, UniqueAxis::None)
        );
    }
}
