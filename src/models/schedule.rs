use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::services::schedule_utils;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BreakLength {
    Short,
    Long,
}

impl BreakLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakLength::Short => "short",
            BreakLength::Long => "long",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            BreakLength::Short => "Short Break",
            BreakLength::Long => "Long Break - Recharge",
        }
    }
}

impl fmt::Display for BreakLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variant payload of a [`ScheduleBlock`]; serialized with a `type` tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BlockKind {
    #[serde(rename_all = "camelCase")]
    Study {
        concept_id: String,
        difficulty: crate::models::concept::Difficulty,
        /// 1-based position of this sub-block within the concept.
        part: u32,
        #[serde(default)]
        key_points: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Break { length: BreakLength },
    #[serde(rename_all = "camelCase")]
    Review {
        concepts_to_review: usize,
        #[serde(default)]
        key_points: Vec<String>,
    },
}

/// A dated `[start_time, end_time)` calendar entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleBlock {
    pub date: NaiveDate,
    #[serde(with = "schedule_utils::hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "schedule_utils::hhmm")]
    pub end_time: NaiveTime,
    pub title: String,
    #[serde(flatten)]
    pub kind: BlockKind,
}

impl ScheduleBlock {
    pub fn duration_minutes(&self) -> u32 {
        schedule_utils::duration_minutes(self.start_time, self.end_time)
    }

    pub fn concept_id(&self) -> Option<&str> {
        match &self.kind {
            BlockKind::Study { concept_id, .. } => Some(concept_id),
            _ => None,
        }
    }

    pub fn key_points(&self) -> &[String] {
        match &self.kind {
            BlockKind::Study { key_points, .. } | BlockKind::Review { key_points, .. } => key_points,
            BlockKind::Break { .. } => &[],
        }
    }

    pub fn is_study(&self) -> bool {
        matches!(self.kind, BlockKind::Study { .. })
    }

    pub fn is_break(&self) -> bool {
        matches!(self.kind, BlockKind::Break { .. })
    }

    pub fn is_review(&self) -> bool {
        matches!(self.kind, BlockKind::Review { .. })
    }

    pub fn type_label(&self) -> &'static str {
        match self.kind {
            BlockKind::Study { .. } => "study",
            BlockKind::Break { .. } => "break",
            BlockKind::Review { .. } => "review",
        }
    }

    pub fn overlaps(&self, other: &ScheduleBlock) -> bool {
        self.date == other.date
            && schedule_utils::overlaps(self.start_time, self.end_time, other.start_time, other.end_time)
    }
}
