//! Consensus unit cell.

use crate::{CellParameter, Centering, LatticeType, UniqueAxis};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A unit cell derived from a filtered crystal population.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnitCell {
    pub lattice_type: LatticeType,
    pub unique_axis: UniqueAxis,
    pub centering: Centering,
    /// Lengths in Å.
    pub a: f64,
    pub b: f64,
    pub c: f64,
    /// Angles in degrees.
    pub alfa: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl UnitCell {
    /// Value of one cell parameter.
    #[must_use]
    pub fn parameter(&self, parameter: CellParameter) -> f64 {
        match parameter {
            CellParameter::A => self.a,
            CellParameter::B => self.b,
            CellParameter::C => self.c,
            CellParameter::Alfa => self.alfa,
            CellParameter::Beta => self.beta,
            CellParameter::Gamma => self.gamma,
        }
    }
}
