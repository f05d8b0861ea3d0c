use serde::{Deserialize, Serialize};

use crate::models::availability::{AvailabilityModel, AvailabilityWindow};
use crate::services::schedule_utils;

pub const DEFAULT_FOCUS_BLOCK_MINUTES: u32 = 50;
pub const DEFAULT_SHORT_BREAK_MINUTES: u32 = 10;
pub const DEFAULT_LONG_BREAK_MINUTES: u32 = 20;
pub const DEFAULT_BLOCKS_BEFORE_LONG_BREAK: u32 = 3;
pub const DEFAULT_WINDOW_START: &str = "09:00";
pub const DEFAULT_WINDOW_END: &str = "21:00";
pub const DEFAULT_REVIEW_MAX_MINUTES: u32 = 90;
pub const DEFAULT_REVIEW_MINUTES_PER_CONCEPT: u32 = 10;
pub const DEFAULT_BREAK_OVERHEAD_RATIO: f64 = 0.2;
pub const DEFAULT_CLAMP_HORIZON_DAYS: u32 = 7;

/// Process-wide planner configuration, persisted as YAML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PlannerSettings {
    pub focus_block_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
    pub blocks_before_long_break: u32,
    pub default_window_start: String,
    pub default_window_end: String,
    pub review_max_minutes: u32,
    pub review_minutes_per_concept: u32,
    /// Share of raw availability reserved for breaks and overhead.
    pub break_overhead_ratio: f64,
    pub clamp_horizon_days: u32,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            focus_block_minutes: DEFAULT_FOCUS_BLOCK_MINUTES,
            short_break_minutes: DEFAULT_SHORT_BREAK_MINUTES,
            long_break_minutes: DEFAULT_LONG_BREAK_MINUTES,
            blocks_before_long_break: DEFAULT_BLOCKS_BEFORE_LONG_BREAK,
            default_window_start: DEFAULT_WINDOW_START.to_string(),
            default_window_end: DEFAULT_WINDOW_END.to_string(),
            review_max_minutes: DEFAULT_REVIEW_MAX_MINUTES,
            review_minutes_per_concept: DEFAULT_REVIEW_MINUTES_PER_CONCEPT,
            break_overhead_ratio: DEFAULT_BREAK_OVERHEAD_RATIO,
            clamp_horizon_days: DEFAULT_CLAMP_HORIZON_DAYS,
        }
    }
}

impl PlannerSettings {
    /// The window applied to every weekday when callers give no availability.
    pub fn default_window(&self) -> AvailabilityWindow {
        let start = schedule_utils::parse_time_or_default(&self.default_window_start);
        let end = schedule_utils::parse_time_or_default(&self.default_window_end);
        AvailabilityWindow::new(start, end).unwrap_or(AvailabilityWindow {
            start: schedule_utils::default_time(),
            end: schedule_utils::to_naive_time(21 * 60),
        })
    }

    pub fn default_availability(&self) -> AvailabilityModel {
        AvailabilityModel::daily(self.default_window())
    }
}

/// Per-request knobs layered over [`PlannerSettings`]; zero values are ignored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleOverrides {
    pub focus_block_minutes: Option<u32>,
    pub short_break_minutes: Option<u32>,
    pub long_break_minutes: Option<u32>,
    pub blocks_before_long_break: Option<u32>,
}

/// Resolved, immutable allocation parameters for one invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocationPolicy {
    pub focus_block_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
    pub blocks_before_long_break: u32,
    pub review_max_minutes: u32,
    pub review_minutes_per_concept: u32,
    pub break_overhead_ratio: f64,
    pub clamp_horizon_days: u32,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self::resolve(&PlannerSettings::default(), &ScheduleOverrides::default())
    }
}

impl AllocationPolicy {
    pub fn resolve(settings: &PlannerSettings, overrides: &ScheduleOverrides) -> Self {
        let pick = |value: Option<u32>, fallback: u32| {
            value.filter(|minutes| *minutes > 0).unwrap_or(fallback).max(1)
        };
        Self {
            focus_block_minutes: pick(overrides.focus_block_minutes, settings.focus_block_minutes),
            short_break_minutes: pick(overrides.short_break_minutes, settings.short_break_minutes),
            long_break_minutes: pick(overrides.long_break_minutes, settings.long_break_minutes),
            blocks_before_long_break: pick(
                overrides.blocks_before_long_break,
                settings.blocks_before_long_break,
            ),
            review_max_minutes: settings.review_max_minutes,
            review_minutes_per_concept: settings.review_minutes_per_concept,
            break_overhead_ratio: settings.break_overhead_ratio.clamp(0.0, 0.99),
            clamp_horizon_days: settings.clamp_horizon_days.max(1),
        }
    }

    pub fn with_focus_block(mut self, minutes: u32) -> Self {
        self.focus_block_minutes = minutes.max(1);
        self
    }
}
