//! Consensus error types.

use cellscope_core::{CellParameter, Centering};
use thiserror::Error;

/// Result type for consensus operations.
pub type Result<T> = std::result::Result<T, ConsensusError>;

/// Reasons a consensus unit cell cannot be built.
///
/// These are reports for the user; nothing is written when they occur.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsensusError {
    /// Some histograms have no region selected yet.
    #[error("select a region on every histogram first (missing: {})", join(.missing))]
    NotReady {
        /// Dimensions without an active region.
        missing: Vec<CellParameter>,
    },

    /// The active regions exclude every crystal.
    #[error("no crystals inside the selected regions")]
    EmptySelection,

    /// No centering reaches the majority threshold.
    #[error("centering is indeterminate: {best} covers {count} of {total} crystals, below {threshold:.0}%")]
    IndeterminateCentering {
        /// Most frequent centering.
        best: Centering,
        /// Crystals with that centering.
        count: usize,
        /// Crystals in the selection.
        total: usize,
        /// Required share in percent.
        threshold: f64,
    },
}

fn join(parameters: &[CellParameter]) -> String {
    parameters
        .iter()
        .map(|p| p.name())
        .collect::<Vec<_>>()
        .join(", ")
}
