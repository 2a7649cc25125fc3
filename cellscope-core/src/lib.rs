//! cellscope-core: Core types for detector geometry and crystal populations.
//!
//! This crate provides the shared data model used by the detector composer
//! and the unit-cell explorer: panel and bad-region geometry, peak records,
//! crystals with their cell parameters, and the consensus unit cell.
//!

pub mod crystal;
pub mod error;
pub mod geometry;
pub mod peak;
pub mod unit_cell;

pub use crystal::{CellParameter, Centering, Crystal, LatticeLabel, LatticeType, UniqueAxis};
pub use error::{Error, GeometryError, Result};
pub use geometry::{BadRegion, DetectorGeometry, PanelGeometry};
pub use peak::{PeakKind, PeakRecord};
pub use unit_cell::UnitCell;
