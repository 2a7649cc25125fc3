//! Normal-distribution fitting.
#![allow(clippy::cast_precision_loss)]

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum-likelihood normal fit of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NormalFit {
    /// Sample mean.
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl NormalFit {
    /// Fits a normal distribution; `None` for an empty sample.
    #[must_use]
    pub fn fit(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            mean,
            std_dev: variance.sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fit() {
        let fit = NormalFit::fit(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_relative_eq!(fit.mean, 5.0);
        assert_relative_eq!(fit.std_dev, 2.0);
    }

    #[test]
    fn test_fit_single_and_empty() {
        let fit = NormalFit::fit(&[79.3]).unwrap();
        assert_relative_eq!(fit.mean, 79.3);
        assert_relative_eq!(fit.std_dev, 0.0);
        assert!(NormalFit::fit(&[]).is_none());
    }
}
