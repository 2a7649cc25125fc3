//! cellscope-cell: Unit-cell histogram exploration.
//!
//! This crate filters a crystal population by regions of interest on the six
//! cell-parameter histograms and derives a consensus unit cell from the
//! crystals that survive every active region:
//! - **Selection** - per-dimension regions, intersection filter, binning
//! - **Histogram** - per-centering bin counts for display
//! - **Consensus** - normal fits, majority centering, lattice classification
//!
#![warn(missing_docs)]

mod consensus;
mod error;
mod histogram;
mod lattice;
mod selection;
mod stats;

pub use consensus::{Consensus, ConsensusBuilder, ConsensusConfig};
pub use error::{ConsensusError, Result};
pub use histogram::Histogram;
pub use lattice::{classify_lattice, LatticeTolerances};
pub use selection::{BinningConfig, Region, SelectionDimension, SelectionSession};
pub use stats::NormalFit;
