//! Engine configuration
//!
//! Every tunable is an explicit constructor input. The engine holds no
//! process-wide state and reads no environment variables; a deployment
//! that wants a different cost model passes a different `EngineConfig`.

use serde::{Deserialize, Serialize};

/// Confidence level for conversion-proportion intervals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    /// 95% two-sided interval.
    #[default]
    NinetyFive,
    /// 99% two-sided interval.
    NinetyNine,
}

impl ConfidenceLevel {
    /// Critical z value for the two-sided interval.
    #[must_use]
    pub const fn z_value(self) -> f64 {
        match self {
            Self::NinetyFive => 1.96,
            Self::NinetyNine => 2.576,
        }
    }
}

/// Tunables for metric assembly and impact projection.
///
/// `cost_ratio` is the fraction of revenue treated as cost when deriving
/// profit per visitor. `projection_window_days` is the observation window
/// the monthly-impact projection assumes the accumulated visitor counts
/// cover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fraction of revenue treated as cost (0.0 to 1.0).
    pub cost_ratio: f64,
    /// Days the observation window is assumed to span when estimating
    /// daily traffic for projections.
    pub projection_window_days: u32,
    /// Confidence level used for conversion-rate intervals.
    pub confidence: ConfidenceLevel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cost_ratio: 0.60,
            projection_window_days: 30,
            confidence: ConfidenceLevel::NinetyFive,
        }
    }
}
