use serde::{Deserialize, Serialize};
use std::fmt;

/// Utilization band used to phrase the recommendation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FeasibilityBand {
    NotFeasible,
    VeryTight,
    Challenging,
    Comfortable,
    Relaxed,
}

impl FeasibilityBand {
    pub fn from_utilization(utilization: f64) -> Self {
        if utilization > 100.0 {
            FeasibilityBand::NotFeasible
        } else if utilization > 80.0 {
            FeasibilityBand::VeryTight
        } else if utilization > 60.0 {
            FeasibilityBand::Challenging
        } else if utilization > 40.0 {
            FeasibilityBand::Comfortable
        } else {
            FeasibilityBand::Relaxed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeasibilityBand::NotFeasible => "not-feasible",
            FeasibilityBand::VeryTight => "very-tight",
            FeasibilityBand::Challenging => "challenging",
            FeasibilityBand::Comfortable => "comfortable",
            FeasibilityBand::Relaxed => "relaxed",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            FeasibilityBand::NotFeasible => {
                "Not feasible - Consider extending deadline or reducing scope"
            }
            FeasibilityBand::VeryTight => "Very tight schedule - Little room for flexibility",
            FeasibilityBand::Challenging => "Challenging but achievable - Stay focused",
            FeasibilityBand::Comfortable => "Comfortable schedule - Good balance",
            FeasibilityBand::Relaxed => "Plenty of time - Consider adding more depth",
        }
    }
}

impl fmt::Display for FeasibilityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeasibilityReport {
    pub feasible: bool,
    pub total_study_minutes: u64,
    /// Effective capacity after the break/overhead reserve, in whole minutes.
    pub available_minutes: u64,
    pub utilization_percentage: f64,
    pub days_available: u32,
    pub concepts_count: usize,
    pub band: FeasibilityBand,
    pub recommendation: String,
}
