//! Crystal records and crystallographic labels.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lattice centering symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Centering {
    #[default]
    P,
    A,
    B,
    C,
    I,
    F,
    H,
    R,
}

impl Centering {
    /// All centerings in enumeration order.
    pub const ALL: [Centering; 8] = [
        Centering::P,
        Centering::A,
        Centering::B,
        Centering::C,
        Centering::I,
        Centering::F,
        Centering::H,
        Centering::R,
    ];

    /// Single-letter symbol.
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Centering::P => 'P',
            Centering::A => 'A',
            Centering::B => 'B',
            Centering::C => 'C',
            Centering::I => 'I',
            Centering::F => 'F',
            Centering::H => 'H',
            Centering::R => 'R',
        }
    }
}

impl fmt::Display for Centering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Centering {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Centering::ALL
            .into_iter()
            .find(|c| s.trim().len() == 1 && s.trim().starts_with(c.symbol()))
            .ok_or_else(|| Error::InvalidCentering(s.to_string()))
    }
}

/// Bravais lattice system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LatticeType {
    #[default]
    Triclinic,
    Monoclinic,
    Orthorhombic,
    Tetragonal,
    Rhombohedral,
    Hexagonal,
    Cubic,
}

impl LatticeType {
    /// Lowercase name as written in stream and cell files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LatticeType::Triclinic => "triclinic",
            LatticeType::Monoclinic => "monoclinic",
            LatticeType::Orthorhombic => "orthorhombic",
            LatticeType::Tetragonal => "tetragonal",
            LatticeType::Rhombohedral => "rhombohedral",
            LatticeType::Hexagonal => "hexagonal",
            LatticeType::Cubic => "cubic",
        }
    }
}

impl fmt::Display for LatticeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LatticeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "triclinic" => Ok(LatticeType::Triclinic),
            "monoclinic" => Ok(LatticeType::Monoclinic),
            "orthorhombic" => Ok(LatticeType::Orthorhombic),
            "tetragonal" => Ok(LatticeType::Tetragonal),
            "rhombohedral" => Ok(LatticeType::Rhombohedral),
            "hexagonal" => Ok(LatticeType::Hexagonal),
            "cubic" => Ok(LatticeType::Cubic),
            other => Err(Error::InvalidLatticeType(other.to_string())),
        }
    }
}

/// Unique axis of a lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UniqueAxis {
    A,
    B,
    C,
    /// Not applicable to the lattice type.
    None,
    /// Not known.
    #[default]
    Unknown,
}

impl UniqueAxis {
    /// Label as written in stream and cell files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UniqueAxis::A => "a",
            UniqueAxis::B => "b",
            UniqueAxis::C => "c",
            UniqueAxis::None => "*",
            UniqueAxis::Unknown => "?",
        }
    }
}

impl fmt::Display for UniqueAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UniqueAxis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "a" => Ok(UniqueAxis::A),
            "b" => Ok(UniqueAxis::B),
            "c" => Ok(UniqueAxis::C),
            "*" => Ok(UniqueAxis::None),
            "?" => Ok(UniqueAxis::Unknown),
            other => Err(Error::InvalidUniqueAxis(other.to_string())),
        }
    }
}

/// Lattice type together with its unique axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LatticeLabel {
    pub lattice_type: LatticeType,
    pub unique_axis: UniqueAxis,
}

impl LatticeLabel {
    #[must_use]
    pub fn new(lattice_type: LatticeType, unique_axis: UniqueAxis) -> Self {
        Self {
            lattice_type,
            unique_axis,
        }
    }

    /// Label used when the source record does not state its lattice.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::default()
    }
}

impl fmt::Display for LatticeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.lattice_type, self.unique_axis)
    }
}

/// One of the six unit-cell parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CellParameter {
    A,
    B,
    C,
    Alfa,
    Beta,
    Gamma,
}

impl CellParameter {
    /// All parameters in evaluation order.
    pub const ALL: [CellParameter; 6] = [
        CellParameter::A,
        CellParameter::B,
        CellParameter::C,
        CellParameter::Alfa,
        CellParameter::Beta,
        CellParameter::Gamma,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            CellParameter::A => "a",
            CellParameter::B => "b",
            CellParameter::C => "c",
            CellParameter::Alfa => "alfa",
            CellParameter::Beta => "beta",
            CellParameter::Gamma => "gamma",
        }
    }

    /// Position in [`CellParameter::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// True for the three angles.
    #[must_use]
    pub fn is_angle(self) -> bool {
        matches!(
            self,
            CellParameter::Alfa | CellParameter::Beta | CellParameter::Gamma
        )
    }

    /// Unit suffix used in reports.
    #[must_use]
    pub fn unit(self) -> &'static str {
        if self.is_angle() {
            "deg"
        } else {
            "A"
        }
    }
}

impl fmt::Display for CellParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for CellParameter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(CellParameter::A),
            "b" => Ok(CellParameter::B),
            "c" => Ok(CellParameter::C),
            "alfa" | "alpha" | "al" => Ok(CellParameter::Alfa),
            "beta" | "be" => Ok(CellParameter::Beta),
            "gamma" | "ga" => Ok(CellParameter::Gamma),
            _ => Err(Error::InvalidCellParameter(s.to_string())),
        }
    }
}

/// An indexed crystal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Crystal {
    /// Identifying name (image file, event and crystal number).
    pub name: String,
    /// Cell lengths in Å.
    pub a: f64,
    pub b: f64,
    pub c: f64,
    /// Cell angles in degrees.
    pub alfa: f64,
    pub beta: f64,
    pub gamma: f64,
    pub centering: Centering,
    pub lattice: LatticeLabel,
}

impl Crystal {
    /// Creates a crystal from its six cell parameters `[a, b, c, alfa, beta, gamma]`.
    pub fn new(
        name: impl Into<String>,
        cell: [f64; 6],
        centering: Centering,
        lattice: LatticeLabel,
    ) -> Self {
        let [a, b, c, alfa, beta, gamma] = cell;
        Self {
            name: name.into(),
            a,
            b,
            c,
            alfa,
            beta,
            gamma,
            centering,
            lattice,
        }
    }

    /// Value of one cell parameter.
    #[inline]
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

    /// The six cell parameters in [`CellParameter::ALL`] order.
    #[must_use]
    pub fn cell(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.alfa, self.beta, self.gamma]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_centering_parse() {
        assert_eq!("C".parse::<Centering>().unwrap(), Centering::C);
        assert_eq!(" R ".parse::<Centering>().unwrap(), Centering::R);
        assert!("X".parse::<Centering>().is_err());
        assert!("PC".parse::<Centering>().is_err());
    }

    #[test]
    fn test_labels_round_trip() {
        for name in ["triclinic", "hexagonal", "cubic"] {
            assert_eq!(name.parse::<LatticeType>().unwrap().as_str(), name);
        }
        assert_eq!("*".parse::<UniqueAxis>().unwrap(), UniqueAxis::None);
        assert_eq!(LatticeLabel::placeholder().to_string(), "triclinic (?)");
    }

    #[test]
    fn test_crystal_parameters() {
        let crystal = Crystal::new(
            "img_001.h5 //3 #0",
            [79.1, 79.2, 38.0, 90.0, 90.1, 89.9],
            Centering::P,
            LatticeLabel::new(LatticeType::Tetragonal, UniqueAxis::C),
        );
        assert_relative_eq!(crystal.parameter(CellParameter::B), 79.2);
        assert_relative_eq!(crystal.parameter(CellParameter::Gamma), 89.9);
        for (parameter, value) in CellParameter::ALL.into_iter().zip(crystal.cell()) {
            assert_relative_eq!(crystal.parameter(parameter), value);
        }
        assert_relative_eq!(crystal.cell()[2], 38.0);
        assert_eq!(CellParameter::Beta.index(), 4);
        assert_eq!("al".parse::<CellParameter>().unwrap(), CellParameter::Alfa);
    }
}
