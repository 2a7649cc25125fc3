//! Consensus unit-cell determination.
#![allow(clippy::cast_precision_loss)]

use crate::lattice::{classify_lattice, LatticeTolerances};
use crate::{ConsensusError, NormalFit, Result, SelectionSession};
use cellscope_core::{CellParameter, Centering, Crystal, UnitCell};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for consensus building.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConsensusConfig {
    /// Minimum share of the selection the majority centering must reach.
    pub centering_threshold: f64,
    /// Tolerances for lattice classification.
    pub tolerances: LatticeTolerances,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            centering_threshold: 0.8,
            tolerances: LatticeTolerances::default(),
        }
    }
}

impl ConsensusConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the majority-centering threshold (fraction in `0..=1`).
    #[must_use]
    pub fn with_centering_threshold(mut self, threshold: f64) -> Self {
        self.centering_threshold = threshold;
        self
    }

    /// Sets the angle tolerance in degrees.
    #[must_use]
    pub fn with_angle_tolerance(mut self, degrees: f64) -> Self {
        self.tolerances.angle = degrees;
        self
    }

    /// Sets the relative length tolerance.
    #[must_use]
    pub fn with_length_tolerance(mut self, fraction: f64) -> Self {
        self.tolerances.length = fraction;
        self
    }
}

/// A consensus unit cell together with the statistics it was derived from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Consensus {
    /// The consensus cell.
    pub cell: UnitCell,
    /// Normal fit per parameter, in [`CellParameter::ALL`] order.
    pub fits: [NormalFit; 6],
    /// Crystals per centering in the selection.
    pub centering_counts: Vec<(Centering, usize)>,
    /// Number of crystals the consensus was built from.
    pub crystals: usize,
}

/// Derives a consensus unit cell from a crystal selection.
#[derive(Debug, Clone, Default)]
pub struct ConsensusBuilder {
    config: ConsensusConfig,
}

impl ConsensusBuilder {
    /// Creates a builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder with custom configuration.
    #[must_use]
    pub fn with_config(config: ConsensusConfig) -> Self {
        Self { config }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// Builds the consensus for a session's included crystals.
    ///
    /// # Errors
    /// [`ConsensusError::NotReady`] until every dimension has a selected
    /// region, otherwise as [`ConsensusBuilder::build`].
    pub fn build_for_session(&self, session: &SelectionSession) -> Result<Consensus> {
        if !session.is_ready() {
            return Err(ConsensusError::NotReady {
                missing: session.unselected(),
            });
        }
        let crystals: Vec<&Crystal> = session.included_crystals().collect();
        self.build(&crystals)
    }

    /// Builds the consensus for a set of crystals.
    ///
    /// # Errors
    /// [`ConsensusError::EmptySelection`] for no crystals and
    /// [`ConsensusError::IndeterminateCentering`] when no centering reaches
    /// the majority threshold.
    pub fn build(&self, crystals: &[&Crystal]) -> Result<Consensus> {
        if crystals.is_empty() {
            return Err(ConsensusError::EmptySelection);
        }

        let mut fits = [NormalFit {
            mean: 0.0,
            std_dev: 0.0,
        }; 6];
        let mut values = Vec::with_capacity(crystals.len());
        for parameter in CellParameter::ALL {
            values.clear();
            values.extend(crystals.iter().map(|c| c.parameter(parameter)));
            fits[parameter.index()] = NormalFit::fit(&values).ok_or(ConsensusError::EmptySelection)?;
        }
        let cell = fits.map(|fit| round2(fit.mean));

        let centering_counts: Vec<(Centering, usize)> = Centering::ALL
            .into_iter()
            .map(|centering| {
                let count = crystals.iter().filter(|c| c.centering == centering).count();
                (centering, count)
            })
            .filter(|&(_, count)| count > 0)
            .collect();
        let centering = self.majority_centering(&centering_counts, crystals.len())?;

        let label = classify_lattice(cell, self.config.tolerances);
        let [a, b, c, alfa, beta, gamma] = cell;

        log::info!(
            "consensus from {} crystals: {} {} ({})",
            crystals.len(),
            label.lattice_type,
            centering,
            label.unique_axis
        );

        Ok(Consensus {
            cell: UnitCell {
                lattice_type: label.lattice_type,
                unique_axis: label.unique_axis,
                centering,
                a,
                b,
                c,
                alfa,
                beta,
                gamma,
            },
            fits,
            centering_counts,
            crystals: crystals.len(),
        })
    }

    /// Most frequent centering, ties going to the earlier symbol in
    /// [`Centering::ALL`].
    fn majority_centering(&self, counts: &[(Centering, usize)], total: usize) -> Result<Centering> {
        let mut best: Option<(Centering, usize)> = None;
        for &(centering, count) in counts {
            if best.map_or(true, |(_, n)| count > n) {
                best = Some((centering, count));
            }
        }
        let (centering, count) = best.ok_or(ConsensusError::EmptySelection)?;

        if (count as f64) < self.config.centering_threshold * total as f64 {
            log::warn!("centering indeterminate: {centering} in {count} of {total} crystals");
            return Err(ConsensusError::IndeterminateCentering {
                best: centering,
                count,
                total,
                threshold: self.config.centering_threshold * 100.0,
            });
        }
        Ok(centering)
    }
}

/// Two decimals, halves to even, matching panel placement rounding.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellscope_core::{LatticeLabel, LatticeType, UniqueAxis};

    fn crystals(cell: [f64; 6], centerings: &[(Centering, usize)]) -> Vec<Crystal> {
        centerings
            .iter()
            .flat_map(|&(centering, n)| {
                (0..n).map(move |i| {
                    Crystal::new(format!("{centering}{i}"), cell, centering, LatticeLabel::placeholder())
                })
            })
            .collect()
    }

    #[test]
    fn test_majority_centering_passes_at_ninety_percent() {
        let population = crystals(
            [60.0, 70.0, 80.0, 90.0, 90.0, 90.0],
            &[(Centering::C, 9), (Centering::P, 1)],
        );
        let refs: Vec<&Crystal> = population.iter().collect();
        let consensus = ConsensusBuilder::new().build(&refs).unwrap();
        assert_eq!(consensus.cell.centering, Centering::C);
        assert_eq!(consensus.cell.lattice_type, LatticeType::Orthorhombic);
        assert_eq!(consensus.crystals, 10);
        assert_eq!(
            consensus.centering_counts,
            vec![(Centering::P, 1), (Centering::C, 9)]
        );
    }

    #[test]
    fn test_majority_centering_fails_at_seventy_percent() {
        let population = crystals(
            [60.0, 70.0, 80.0, 90.0, 90.0, 90.0],
            &[(Centering::C, 7), (Centering::P, 3)],
        );
        let refs: Vec<&Crystal> = population.iter().collect();
        let err = ConsensusBuilder::new().build(&refs).unwrap_err();
        assert!(matches!(
            err,
            ConsensusError::IndeterminateCentering {
                best: Centering::C,
                count: 7,
                total: 10,
                ..
            }
        ));
    }

    #[test]
    fn test_exact_threshold_passes() {
        let population = crystals(
            [60.0, 70.0, 80.0, 90.0, 90.0, 90.0],
            &[(Centering::I, 4), (Centering::F, 1)],
        );
        let refs: Vec<&Crystal> = population.iter().collect();
        let consensus = ConsensusBuilder::new().build(&refs).unwrap();
        assert_eq!(consensus.cell.centering, Centering::I);
    }

    #[test]
    fn test_tie_goes_to_first_symbol() {
        let population = crystals(
            [60.0, 70.0, 80.0, 90.0, 90.0, 90.0],
            &[(Centering::R, 1), (Centering::A, 1)],
        );
        let refs: Vec<&Crystal> = population.iter().collect();
        let builder = ConsensusBuilder::with_config(ConsensusConfig::new().with_centering_threshold(0.5));
        assert_eq!(builder.build(&refs).unwrap().cell.centering, Centering::A);
    }

    #[test]
    fn test_means_are_rounded() {
        let population = vec![
            Crystal::new("x", [5.001, 5.0, 7.0, 90.0, 90.0, 120.0], Centering::P, LatticeLabel::placeholder()),
            Crystal::new("y", [5.012, 5.0, 7.0, 90.0, 90.0, 120.0], Centering::P, LatticeLabel::placeholder()),
        ];
        let refs: Vec<&Crystal> = population.iter().collect();
        let consensus = ConsensusBuilder::new().build(&refs).unwrap();
        assert!((consensus.cell.a - 5.01).abs() < 1e-12);
        assert!((consensus.fits[0].mean - 5.0065).abs() < 1e-12);
        assert_eq!(consensus.cell.lattice_type, LatticeType::Hexagonal);
        assert_eq!(consensus.cell.unique_axis, UniqueAxis::C);
    }

    #[test]
    fn test_rounding_halves_go_to_even() {
        assert!((round2(0.125) - 0.12).abs() < 1e-12);
        assert!((round2(0.375) - 0.38).abs() < 1e-12);
        assert!((round2(-0.125) + 0.12).abs() < 1e-12);

        let population = vec![
            Crystal::new("x", [0.125, 5.0, 7.0, 90.0, 90.0, 120.0], Centering::P, LatticeLabel::placeholder()),
            Crystal::new("y", [0.125, 5.0, 7.0, 90.0, 90.0, 120.0], Centering::P, LatticeLabel::placeholder()),
        ];
        let refs: Vec<&Crystal> = population.iter().collect();
        let consensus = ConsensusBuilder::new().build(&refs).unwrap();
        assert!((consensus.cell.a - 0.12).abs() < 1e-12);
    }

    #[test]
    fn test_empty_selection() {
        assert_eq!(
            ConsensusBuilder::new().build(&[]).unwrap_err(),
            ConsensusError::EmptySelection
        );
    }
}
