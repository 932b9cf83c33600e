//! Score types

use serde::{Deserialize, Serialize};

/// Sample density of a value series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Coarse,
    Medium,
    Fine,
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Granularity::Coarse => write!(f, "coarse"),
            Granularity::Medium => write!(f, "medium"),
            Granularity::Fine => write!(f, "fine"),
        }
    }
}

/// How promising a value series is for a chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisualPotentialScore {
    /// Coefficient of variation, always >= 0
    pub volatility: f64,
    pub granularity: Granularity,
    /// Number of samples scored
    pub sample_count: usize,
    pub verdict: bool,
}
