use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::models::availability::{AvailabilityModel, AvailabilityWindow};
use crate::models::concept::Concept;
use crate::models::schedule::{BlockKind, ScheduleBlock};
use crate::models::settings::AllocationPolicy;
use crate::models::timeline::{Milestone, MilestonePhase, TimelinePlan};
use crate::services::schedule_utils;

const REVIEW_TITLE: &str = "Comprehensive Review Session";
const DEFAULT_GOAL_TITLE: &str = "Study Plan";

const REVIEW_KEY_POINTS: [&str; 3] = [
    "Revisit the key points of every studied concept",
    "Work practice questions on the hardest topics",
    "List remaining doubts for a last targeted pass",
];

pub struct ReviewPlanner<'a> {
    availability: &'a AvailabilityModel,
    policy: AllocationPolicy,
}

impl<'a> ReviewPlanner<'a> {
    pub fn new(availability: &'a AvailabilityModel, policy: AllocationPolicy) -> Self {
        Self {
            availability,
            policy,
        }
    }

    pub fn review_minutes(&self, scheduled_concepts: usize) -> u32 {
        let per_concept = u64::from(self.policy.review_minutes_per_concept);
        let wanted = per_concept.saturating_mul(scheduled_concepts as u64);
        wanted.min(u64::from(self.policy.review_max_minutes)) as u32
    }

    /// One review block the day before the deadline, in the earliest free slot
    /// of that day's windows. `None` when the horizon is a day or less, nothing
    /// was scheduled, or the review day has no room.
    pub fn plan_review(
        &self,
        scheduled: &[Concept],
        existing: &[ScheduleBlock],
        start_date: NaiveDate,
        deadline: NaiveDateTime,
    ) -> Option<ScheduleBlock> {
        let review_at = deadline - Duration::days(1);
        if review_at <= schedule_utils::start_of_day(start_date) {
            debug!(target: "app::planner::review", "horizon too short for a review session");
            return None;
        }

        let duration = self.review_minutes(scheduled.len());
        if duration == 0 {
            debug!(target: "app::planner::review", "no scheduled concepts to review");
            return None;
        }

        let review_date = review_at.date();
        let mut busy: Vec<(u32, u32)> = existing
            .iter()
            .filter(|block| block.date == review_date)
            .map(|block| {
                (
                    schedule_utils::minutes_from_midnight(block.start_time),
                    schedule_utils::minutes_from_midnight(block.end_time),
                )
            })
            .collect();
        busy.sort_unstable();

        let windows = self.availability.windows_for(review_date.weekday());
        let slot = windows
            .iter()
            .find_map(|window| earliest_free_slot(window, &busy, duration));

        let Some(start) = slot else {
            warn!(
                target: "app::planner::review",
                date = %review_date,
                duration,
                "no free slot for the review session, omitting it"
            );
            return None;
        };

        Some(ScheduleBlock {
            date: review_date,
            start_time: schedule_utils::to_naive_time(start),
            end_time: schedule_utils::to_naive_time(start + duration),
            title: REVIEW_TITLE.to_string(),
            kind: BlockKind::Review {
                concepts_to_review: scheduled.len(),
                key_points: REVIEW_KEY_POINTS.iter().map(|p| p.to_string()).collect(),
            },
        })
    }
}

fn earliest_free_slot(window: &AvailabilityWindow, busy: &[(u32, u32)], duration: u32) -> Option<u32> {
    let mut candidate = window.start_minute();
    for &(start, end) in busy {
        if end <= candidate {
            continue;
        }
        if start >= candidate + duration {
            break;
        }
        candidate = end;
    }
    (candidate + duration <= window.end_minute()).then_some(candidate)
}

pub fn days_remaining(start_date: NaiveDate, deadline: NaiveDateTime) -> u32 {
    (deadline.date() - start_date).num_days().max(1) as u32
}

pub fn build_milestones(start_date: NaiveDate, days_remaining: u32) -> Vec<Milestone> {
    let days = days_remaining.max(1);
    let mut phases = vec![MilestonePhase::Foundation, MilestonePhase::Core];
    if days > 3 {
        phases.push(MilestonePhase::DeepDive);
    }
    phases.push(MilestonePhase::FinalReview);

    phases
        .into_iter()
        .map(|phase| {
            let offset = (days * phase.day_percent()).div_ceil(100).clamp(1, days);
            Milestone {
                date: start_date + Duration::days(i64::from(offset)),
                phase,
                label: phase.label().to_string(),
                target: phase.target().to_string(),
                tips: phase.tips().to_string(),
            }
        })
        .collect()
}

pub fn build_timeline(
    goal_title: Option<&str>,
    start_date: NaiveDate,
    deadline: NaiveDateTime,
    total_concepts: usize,
    unplaced_concepts: usize,
    review: Option<&ScheduleBlock>,
) -> TimelinePlan {
    let days = days_remaining(start_date, deadline);
    let goal_title = goal_title
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .unwrap_or(DEFAULT_GOAL_TITLE)
        .to_string();

    let mut success_criteria = vec![format!(
        "Study all {total_concepts} concepts before {}",
        deadline.format("%Y-%m-%d %H:%M")
    )];
    if unplaced_concepts > 0 {
        success_criteria.push(format!(
            "Find extra time for {unplaced_concepts} concept(s) the calendar could not fit"
        ));
    }
    if let Some(review) = review {
        success_criteria.push(format!(
            "Complete the comprehensive review on {} at {}",
            review.date,
            schedule_utils::format_time(review.start_time)
        ));
    }
    success_criteria.push("Take every scheduled break to keep focus blocks effective".to_string());

    TimelinePlan {
        goal_title,
        days_remaining: days,
        milestones: build_milestones(start_date, days),
        success_criteria,
    }
}
