use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::models::concept::Difficulty;
use crate::models::schedule::{BlockKind, ScheduleBlock};
use crate::models::session::{FocusLevel, StudySession};
use crate::services::schedule_utils;

const REVIEW_TOPIC: &str = "Comprehensive Review";

fn focus_for(difficulty: Difficulty) -> FocusLevel {
    match difficulty {
        Difficulty::Easy => FocusLevel::Low,
        Difficulty::Medium => FocusLevel::Medium,
        Difficulty::Hard => FocusLevel::High,
    }
}

fn tips_for(level: FocusLevel) -> &'static str {
    match level {
        FocusLevel::High => "Tackle the hardest material first and protect the long breaks.",
        FocusLevel::Medium => "Alternate reading with short recall checks between blocks.",
        FocusLevel::Low => "Light day: use spare time to skim upcoming topics.",
    }
}

/// Rolls blocks up into one session per calendar day. Break time is excluded
/// from `duration_hours`.
pub fn summarize_sessions(blocks: &[ScheduleBlock], start_date: NaiveDate) -> Vec<StudySession> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&ScheduleBlock>> = BTreeMap::new();
    for block in blocks.iter().filter(|b| !b.is_break()) {
        by_date.entry(block.date).or_default().push(block);
    }

    by_date
        .into_iter()
        .map(|(date, day_blocks)| {
            let mut topics: Vec<String> = Vec::new();
            let mut minutes = 0u32;
            let mut focus: Option<FocusLevel> = None;

            for block in day_blocks {
                minutes += block.duration_minutes();
                let topic = match &block.kind {
                    BlockKind::Study { difficulty, .. } => {
                        let level = focus_for(*difficulty);
                        focus = Some(focus.map_or(level, |current| current.max(level)));
                        block.title.trim_start_matches("Study: ").to_string()
                    }
                    BlockKind::Review { .. } => REVIEW_TOPIC.to_string(),
                    BlockKind::Break { .. } => continue,
                };
                if !topics.contains(&topic) {
                    topics.push(topic);
                }
            }

            let focus_level = focus.unwrap_or(FocusLevel::Medium);
            StudySession {
                day: ((date - start_date).num_days() + 1).max(1) as u32,
                date,
                day_name: schedule_utils::weekday_name(date.weekday()).to_string(),
                topics,
                duration_hours: (f64::from(minutes) / 60.0 * 100.0).round() / 100.0,
                focus_level,
                tips: tips_for(focus_level).to_string(),
            }
        })
        .collect()
}
