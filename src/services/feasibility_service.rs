use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;

use crate::models::availability::AvailabilityModel;
use crate::models::concept::Concept;
use crate::models::feasibility::{FeasibilityBand, FeasibilityReport};
use crate::models::settings::AllocationPolicy;
use crate::services::schedule_utils;

const GUARDED_UTILIZATION: f64 = 100.0;

pub fn total_study_minutes(concepts: &[Concept]) -> u64 {
    concepts.iter().map(|c| u64::from(c.estimated_minutes)).sum()
}

/// Scores the concept set against the capacity before the deadline.
///
/// Independent of allocator output: the allocator may place more or less than
/// this model predicts, and neither value is adjusted to match the other.
pub fn validate_schedule_feasibility(
    concepts: &[Concept],
    deadline: NaiveDateTime,
    availability: &AvailabilityModel,
    start_date: NaiveDate,
    policy: &AllocationPolicy,
) -> FeasibilityReport {
    let deadline = schedule_utils::resolve_deadline(start_date, deadline, policy.clamp_horizon_days);
    let total = total_study_minutes(concepts);
    let days_available = (schedule_utils::whole_days_until(start_date, deadline) + 1).max(1) as u32;

    let weekly = f64::from(availability.weekly_minutes());
    let raw_available = weekly * f64::from(days_available) / 7.0;
    let effective = raw_available * (1.0 - policy.break_overhead_ratio);

    // With no capacity the percentage is pinned, so the verdict comes from the
    // minute totals instead of the utilization.
    let (utilization, feasible, band) = if effective <= 0.0 {
        if total == 0 {
            (0.0, true, FeasibilityBand::Relaxed)
        } else {
            (GUARDED_UTILIZATION, false, FeasibilityBand::NotFeasible)
        }
    } else {
        let utilization = round_up_one_decimal(total as f64 / effective * 100.0);
        (utilization, total as f64 <= effective, FeasibilityBand::from_utilization(utilization))
    };

    let report = FeasibilityReport {
        feasible,
        total_study_minutes: total,
        available_minutes: effective.max(0.0).floor() as u64,
        utilization_percentage: utilization,
        days_available,
        concepts_count: concepts.len(),
        band,
        recommendation: band.recommendation().to_string(),
    };

    info!(
        target: "app::planner::feasibility",
        feasible = report.feasible,
        total = report.total_study_minutes,
        available = report.available_minutes,
        utilization = report.utilization_percentage,
        "feasibility computed"
    );
    report
}

/// Rounds up so a ratio just above 100% is never reported as 100.0.
fn round_up_one_decimal(value: f64) -> f64 {
    if value <= 0.0 {
        return 0.0;
    }
    (value * 10.0 - 1e-9).ceil() / 10.0
}
