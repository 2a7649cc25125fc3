//! Region-of-interest selection across the six cell-parameter histograms.
//!
//! A [`SelectionSession`] owns the crystal population and the selection
//! state. Every region change recomputes the included/excluded split from
//! scratch: a crystal is included only if it lies inside every active
//! region. Crystals are referred to by their index in the population.

use crate::Histogram;
use cellscope_core::{CellParameter, Centering, Crystal};
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for histogram binning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BinningConfig {
    /// Bin count used when the session is created.
    pub initial_bins: usize,
    /// Lower clamp for resolution changes.
    pub min_bins: usize,
    /// Upper clamp for resolution changes.
    pub max_bins: usize,
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self {
            initial_bins: 32,
            min_bins: 2,
            max_bins: 512,
        }
    }
}

impl BinningConfig {
    /// Creates a binning configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial bin count.
    #[must_use]
    pub fn with_initial_bins(mut self, bins: usize) -> Self {
        self.initial_bins = bins;
        self
    }

    fn clamp(&self, bins: usize) -> usize {
        bins.clamp(self.min_bins, self.max_bins)
    }
}

/// Closed interval on one cell parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Region {
    /// Lower bound (inclusive).
    pub lo: f64,
    /// Upper bound (inclusive).
    pub hi: f64,
}

impl Region {
    /// Creates a region, swapping the bounds if needed.
    #[must_use]
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            lo: a.min(b),
            hi: a.max(b),
        }
    }

    /// True if `value` lies inside the region.
    #[inline]
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lo && value <= self.hi
    }
}

/// Selection state and histogram of one cell parameter.
#[derive(Debug, Clone)]
pub struct SelectionDimension {
    parameter: CellParameter,
    region: Option<Region>,
    selected: bool,
    bins: usize,
    range: (f64, f64),
    histogram: Histogram,
}

impl SelectionDimension {
    fn new(parameter: CellParameter, range: (f64, f64), bins: usize) -> Self {
        Self {
            parameter,
            region: None,
            selected: false,
            bins,
            range,
            histogram: Histogram::default(),
        }
    }

    /// The cell parameter this dimension filters.
    #[must_use]
    pub fn parameter(&self) -> CellParameter {
        self.parameter
    }

    /// Active region, if any.
    #[must_use]
    pub fn region(&self) -> Option<Region> {
        self.region
    }

    /// True while a region is selected on this dimension.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Bin count this dimension's histogram was last built with.
    #[must_use]
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Value range of the full population on this dimension.
    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Current histogram.
    #[must_use]
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }
}

/// Interactive filter over a crystal population.
#[derive(Debug, Clone)]
pub struct SelectionSession {
    population: Vec<Crystal>,
    dimensions: Vec<SelectionDimension>,
    included: Vec<usize>,
    excluded: Vec<usize>,
    binning: BinningConfig,
    bins: usize,
}

impl SelectionSession {
    /// Creates a session with no active regions: every crystal is included.
    #[must_use]
    pub fn new(population: Vec<Crystal>, binning: BinningConfig) -> Self {
        let bins = binning.clamp(binning.initial_bins);
        let dimensions = CellParameter::ALL
            .into_iter()
            .map(|parameter| {
                let range = population
                    .iter()
                    .map(|crystal| crystal.parameter(parameter))
                    .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                        None => Some((v, v)),
                    })
                    .unwrap_or((0.0, 0.0));
                SelectionDimension::new(parameter, range, bins)
            })
            .collect();

        let mut session = Self {
            included: (0..population.len()).collect(),
            excluded: Vec::new(),
            population,
            dimensions,
            binning,
            bins,
        };
        session.refresh_histograms();
        session
    }

    /// The full population.
    #[must_use]
    pub fn population(&self) -> &[Crystal] {
        &self.population
    }

    /// All six dimensions in evaluation order.
    #[must_use]
    pub fn dimensions(&self) -> &[SelectionDimension] {
        &self.dimensions
    }

    /// One dimension.
    #[must_use]
    pub fn dimension(&self, parameter: CellParameter) -> &SelectionDimension {
        &self.dimensions[parameter.index()]
    }

    /// Indices of crystals inside every active region, in population order.
    #[must_use]
    pub fn included(&self) -> &[usize] {
        &self.included
    }

    /// Indices of crystals outside at least one active region.
    #[must_use]
    pub fn excluded(&self) -> &[usize] {
        &self.excluded
    }

    /// Included crystals.
    pub fn included_crystals(&self) -> impl Iterator<Item = &Crystal> + '_ {
        self.included.iter().map(|&i| &self.population[i])
    }

    /// Shared bin count.
    #[must_use]
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// True once every dimension has a selected region.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.dimensions.iter().all(SelectionDimension::is_selected)
    }

    /// Dimensions without a selected region.
    #[must_use]
    pub fn unselected(&self) -> Vec<CellParameter> {
        self.dimensions
            .iter()
            .filter(|d| !d.selected)
            .map(SelectionDimension::parameter)
            .collect()
    }

    /// Sets the region of interest on one dimension and recomputes the
    /// selection.
    ///
    /// Equal bounds clear the dimension's region instead.
    #[allow(clippy::float_cmp)]
    pub fn set_region(&mut self, parameter: CellParameter, lo: f64, hi: f64) {
        let dimension = &mut self.dimensions[parameter.index()];
        if lo == hi {
            dimension.region = None;
            dimension.selected = false;
            log::debug!("{parameter}: region cleared");
        } else {
            let region = Region::new(lo, hi);
            dimension.region = Some(region);
            dimension.selected = true;
            log::debug!("{parameter}: region [{}, {}]", region.lo, region.hi);
        }
        self.recompute();
    }

    /// Clears every region.
    pub fn reset(&mut self) {
        for dimension in &mut self.dimensions {
            dimension.region = None;
            dimension.selected = false;
        }
        self.recompute();
    }

    /// Doubles the bin count of selected dimensions, up to the configured maximum.
    pub fn increase_resolution(&mut self) {
        self.set_bins(self.bins.saturating_mul(2));
    }

    /// Halves the bin count of selected dimensions, down to the configured minimum.
    pub fn decrease_resolution(&mut self) {
        self.set_bins(self.bins / 2);
    }

    fn set_bins(&mut self, bins: usize) {
        self.bins = self.binning.clamp(bins);
        for dimension in &mut self.dimensions {
            if dimension.selected {
                dimension.bins = self.bins;
            }
        }
        self.refresh_histograms();
    }

    fn recompute(&mut self) {
        let active: Vec<(CellParameter, Region)> = self
            .dimensions
            .iter()
            .filter_map(|d| d.region.map(|r| (d.parameter, r)))
            .collect();

        self.included.clear();
        self.excluded.clear();
        for (index, crystal) in self.population.iter().enumerate() {
            let inside = active
                .iter()
                .all(|(parameter, region)| region.contains(crystal.parameter(*parameter)));
            if inside {
                self.included.push(index);
            } else {
                self.excluded.push(index);
            }
        }

        log::debug!(
            "selection: {} included, {} excluded over {} active regions",
            self.included.len(),
            self.excluded.len(),
            active.len()
        );
        self.refresh_histograms();
    }

    fn refresh_histograms(&mut self) {
        for dimension in &mut self.dimensions {
            let parameter = dimension.parameter;
            let mut included: BTreeMap<Centering, Vec<f64>> = BTreeMap::new();
            for &i in &self.included {
                let crystal = &self.population[i];
                included
                    .entry(crystal.centering)
                    .or_default()
                    .push(crystal.parameter(parameter));
            }
            let excluded = self
                .excluded
                .iter()
                .map(|&i| self.population[i].parameter(parameter))
                .collect();
            dimension.histogram = Histogram::build(included, excluded, dimension.range, dimension.bins);
        }
    }
}
