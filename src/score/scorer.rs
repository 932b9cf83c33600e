//! Visual potential scoring

use super::types::{Granularity, VisualPotentialScore};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default minimum coefficient of variation for a "dynamic" series
pub const DEFAULT_MIN_VOLATILITY: f64 = 0.05;

/// Smallest series length classified as `Medium`
pub const DEFAULT_MEDIUM_MIN_SAMPLES: usize = 12;

/// Smallest series length classified as `Fine`
pub const DEFAULT_FINE_MIN_SAMPLES: usize = 100;

/// Scores a value series by volatility and sample density
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualPotentialScorer {
    /// Volatility must exceed this to pass on dynamics alone
    pub min_volatility: f64,
    pub medium_min_samples: usize,
    pub fine_min_samples: usize,
}

impl Default for VisualPotentialScorer {
    fn default() -> Self {
        Self {
            min_volatility: DEFAULT_MIN_VOLATILITY,
            medium_min_samples: DEFAULT_MEDIUM_MIN_SAMPLES,
            fine_min_samples: DEFAULT_FINE_MIN_SAMPLES,
        }
    }
}

impl VisualPotentialScorer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_min_volatility(mut self, threshold: f64) -> Self {
        self.min_volatility = threshold;
        self
    }

    #[must_use]
    pub fn with_granularity_bounds(mut self, medium_min: usize, fine_min: usize) -> Self {
        self.medium_min_samples = medium_min;
        self.fine_min_samples = fine_min;
        self
    }

    /// Score a series. `None` for an empty series.
    pub fn score(&self, series: &[f64]) -> Option<VisualPotentialScore> {
        if series.is_empty() {
            return None;
        }

        let volatility = volatility(series);
        let granularity = self.granularity(series.len());
        let verdict = volatility > self.min_volatility || granularity == Granularity::Fine;

        debug!(
            samples = series.len(),
            volatility,
            granularity = %granularity,
            verdict,
            "Scored value series"
        );

        Some(VisualPotentialScore {
            volatility,
            granularity,
            sample_count: series.len(),
            verdict,
        })
    }

    /// Classify a sample count
    pub fn granularity(&self, len: usize) -> Granularity {
        if len >= self.fine_min_samples {
            Granularity::Fine
        } else if len >= self.medium_min_samples {
            Granularity::Medium
        } else {
            Granularity::Coarse
        }
    }
}

/// Score with default thresholds (convenience function)
pub fn score_series(series: &[f64]) -> Option<VisualPotentialScore> {
    VisualPotentialScorer::default().score(series)
}

/// Coefficient of variation: sample standard deviation over the magnitude
/// of the mean.
///
/// A zero-mean series has volatility 0, as does a single sample.
pub fn volatility(series: &[f64]) -> f64 {
    let n = series.len();
    if n < 2 {
        return 0.0;
    }

    let mean = series.iter().sum::<f64>() / n as f64;
    if mean == 0.0 || !mean.is_finite() {
        return 0.0;
    }

    let variance = series.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let cv = variance.sqrt() / mean.abs();

    if cv.is_finite() {
        cv
    } else {
        0.0
    }
}
