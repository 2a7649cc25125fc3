//! Binned cell-parameter histograms.
//!
//! Histograms are display data only: they are rebuilt after every selection
//! change and never feed back into the selection itself.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]

use cellscope_core::Centering;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Histogram of one cell parameter, split by centering and by selection state.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Histogram {
    /// Bin edges, `bins + 1` values.
    pub edges: Vec<f64>,
    /// Included values per centering.
    pub included: BTreeMap<Centering, Vec<f64>>,
    /// Excluded values, any centering.
    pub excluded: Vec<f64>,
    /// Bin counts of included values per centering.
    pub included_counts: BTreeMap<Centering, Vec<usize>>,
    /// Bin counts of excluded values.
    pub excluded_counts: Vec<usize>,
}

impl Histogram {
    /// Bins the partitioned values over `range` with `bins` equal-width bins.
    ///
    /// A zero-width range is widened by half a unit on each side.
    #[must_use]
    pub fn build(
        included: BTreeMap<Centering, Vec<f64>>,
        excluded: Vec<f64>,
        range: (f64, f64),
        bins: usize,
    ) -> Self {
        let bins = bins.max(1);
        let (lo, hi) = if range.1 > range.0 {
            range
        } else {
            (range.0 - 0.5, range.0 + 0.5)
        };
        let width = (hi - lo) / bins as f64;
        let edges = (0..=bins).map(|i| lo + width * i as f64).collect();

        let count = |values: &[f64]| {
            let mut counts = vec![0usize; bins];
            for &value in values {
                if value < lo || value > hi || value.is_nan() {
                    continue;
                }
                let bin = (((value - lo) / width) as usize).min(bins - 1);
                counts[bin] += 1;
            }
            counts
        };

        let included_counts = included
            .iter()
            .map(|(&centering, values)| (centering, count(values)))
            .collect();
        let excluded_counts = count(&excluded);

        Self {
            edges,
            included,
            excluded,
            included_counts,
            excluded_counts,
        }
    }

    /// Number of bins.
    #[must_use]
    pub fn bins(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    /// Included counts summed over every centering.
    #[must_use]
    pub fn total_included_counts(&self) -> Vec<usize> {
        let mut totals = vec![0usize; self.bins()];
        for counts in self.included_counts.values() {
            for (total, count) in totals.iter_mut().zip(counts) {
                *total += count;
            }
        }
        totals
    }

    /// Number of included values.
    #[must_use]
    pub fn included_len(&self) -> usize {
        self.included.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_counts() {
        let mut included = BTreeMap::new();
        included.insert(Centering::P, vec![0.0, 0.5, 9.9, 10.0]);
        included.insert(Centering::C, vec![5.0]);
        let histogram = Histogram::build(included, vec![2.5, 7.5], (0.0, 10.0), 4);

        assert_eq!(histogram.bins(), 4);
        assert_eq!(histogram.included_counts[&Centering::P], vec![2, 0, 0, 2]);
        assert_eq!(histogram.included_counts[&Centering::C], vec![0, 0, 1, 0]);
        assert_eq!(histogram.excluded_counts, vec![0, 1, 0, 1]);
        assert_eq!(histogram.total_included_counts(), vec![2, 0, 1, 2]);
        assert_eq!(histogram.included_len(), 5);
    }

    #[test]
    fn test_zero_width_range() {
        let mut included = BTreeMap::new();
        included.insert(Centering::I, vec![90.0, 90.0]);
        let histogram = Histogram::build(included, Vec::new(), (90.0, 90.0), 2);
        assert!((histogram.edges[0] - 89.5).abs() < 1e-12);
        assert_eq!(histogram.included_counts[&Centering::I], vec![0, 2]);
    }
}
