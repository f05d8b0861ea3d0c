use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MilestonePhase {
    Foundation,
    Core,
    DeepDive,
    FinalReview,
}

impl MilestonePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            MilestonePhase::Foundation => "foundation",
            MilestonePhase::Core => "core",
            MilestonePhase::DeepDive => "deep-dive",
            MilestonePhase::FinalReview => "final-review",
        }
    }

    /// Percentage of the horizon at which this checkpoint falls.
    pub fn day_percent(&self) -> u32 {
        match self {
            MilestonePhase::Foundation => 20,
            MilestonePhase::Core => 50,
            MilestonePhase::DeepDive => 80,
            MilestonePhase::FinalReview => 100,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MilestonePhase::Foundation => "Foundation",
            MilestonePhase::Core => "Core Concepts",
            MilestonePhase::DeepDive => "Deep Dive",
            MilestonePhase::FinalReview => "Final Review",
        }
    }

    pub fn target(&self) -> &'static str {
        match self {
            MilestonePhase::Foundation => "Work through the hardest concepts while attention is freshest",
            MilestonePhase::Core => "Have at least half of the concept list studied once",
            MilestonePhase::DeepDive => "Finish first-pass study and revisit weak spots",
            MilestonePhase::FinalReview => "Complete the comprehensive review before the deadline",
        }
    }

    pub fn tips(&self) -> &'static str {
        match self {
            MilestonePhase::Foundation => "Keep sessions distraction-free and take every scheduled break.",
            MilestonePhase::Core => "Summarise each concept in your own words after studying it.",
            MilestonePhase::DeepDive => "Use practice questions to find gaps instead of rereading notes.",
            MilestonePhase::FinalReview => "Review key points only; avoid starting new material now.",
        }
    }
}

impl fmt::Display for MilestonePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dated checkpoint on the timeline. Not a schedulable block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub date: NaiveDate,
    pub phase: MilestonePhase,
    pub label: String,
    pub target: String,
    pub tips: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePlan {
    pub goal_title: String,
    pub days_remaining: u32,
    pub milestones: Vec<Milestone>,
    pub success_criteria: Vec<String>,
}
