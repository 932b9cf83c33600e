//! Visual potential scoring module
//!
//! A series qualifies for visualization either by moving enough
//! (volatility above a threshold) or by being dense enough (fine
//! granularity), even if it is nearly flat.

mod scorer;
mod types;

pub use scorer::{
    score_series, volatility, VisualPotentialScorer, DEFAULT_FINE_MIN_SAMPLES,
    DEFAULT_MEDIUM_MIN_SAMPLES, DEFAULT_MIN_VOLATILITY,
};
pub use types::{Granularity, VisualPotentialScore};

#[cfg(test)]
mod tests;
