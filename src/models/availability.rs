use std::collections::BTreeMap;

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::services::schedule_utils;

pub const DEFAULT_KEY: &str = "default";

/// Raw availability as supplied by callers: weekday name (any case) or `default`
/// mapped to `"HH:MM"` windows.
pub type AvailabilityInput = BTreeMap<String, Vec<WindowInput>>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowInput {
    pub start: String,
    pub end: String,
}

impl WindowInput {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// A validated time-of-day interval `[start, end)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilityWindow {
    #[serde(with = "schedule_utils::hhmm")]
    pub start: NaiveTime,
    #[serde(with = "schedule_utils::hhmm")]
    pub end: NaiveTime,
}

impl AvailabilityWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn start_minute(&self) -> u32 {
        schedule_utils::minutes_from_midnight(self.start)
    }

    pub fn end_minute(&self) -> u32 {
        schedule_utils::minutes_from_midnight(self.end)
    }

    pub fn duration_minutes(&self) -> u32 {
        self.end_minute() - self.start_minute()
    }

    pub fn contains(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.start <= start && end <= self.end
    }
}

/// Per-weekday availability with an optional fallback for unlisted weekdays.
///
/// A weekday listed with an empty window list has no availability; it does not
/// fall back to `default`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AvailabilityModel {
    weekdays: [Option<Vec<AvailabilityWindow>>; 7],
    fallback: Option<Vec<AvailabilityWindow>>,
}

impl AvailabilityModel {
    /// Every weekday gets the same single window.
    pub fn daily(window: AvailabilityWindow) -> Self {
        Self {
            weekdays: Default::default(),
            fallback: Some(vec![window]),
        }
    }

    pub fn from_input(input: &AvailabilityInput) -> Self {
        let mut model = Self::default();
        for (key, windows) in input {
            let normalized = key.trim().to_lowercase();
            let resolved = normalize_windows(&normalized, windows);
            if normalized == DEFAULT_KEY {
                model.fallback = Some(resolved);
            } else if let Some(weekday) = schedule_utils::parse_weekday(&normalized) {
                model.weekdays[weekday.num_days_from_monday() as usize] = Some(resolved);
            } else {
                warn!(target: "app::planner", key = %key, "ignoring unknown availability key");
            }
        }
        model
    }

    /// Fills in `window` for unlisted weekdays when the input carried no
    /// `default` entry.
    pub fn or_default_window(mut self, window: AvailabilityWindow) -> Self {
        if self.fallback.is_none() {
            self.fallback = Some(vec![window]);
        }
        self
    }

    pub fn with_weekday(mut self, weekday: Weekday, windows: Vec<AvailabilityWindow>) -> Self {
        self.weekdays[weekday.num_days_from_monday() as usize] = Some(windows);
        self
    }

    pub fn windows_for(&self, weekday: Weekday) -> &[AvailabilityWindow] {
        self.weekdays[weekday.num_days_from_monday() as usize]
            .as_deref()
            .or(self.fallback.as_deref())
            .unwrap_or(&[])
    }

    /// Total available minutes across one Monday-to-Sunday week.
    pub fn weekly_minutes(&self) -> u32 {
        schedule_utils::ALL_WEEKDAYS
            .iter()
            .flat_map(|weekday| self.windows_for(*weekday))
            .map(AvailabilityWindow::duration_minutes)
            .sum()
    }
}

fn normalize_windows(key: &str, windows: &[WindowInput]) -> Vec<AvailabilityWindow> {
    let mut parsed: Vec<AvailabilityWindow> = Vec::with_capacity(windows.len());
    for raw in windows {
        let start = schedule_utils::parse_time_or_default(&raw.start);
        let end = schedule_utils::parse_time_or_default(&raw.end);
        match AvailabilityWindow::new(start, end) {
            Some(window) => parsed.push(window),
            None => warn!(
                target: "app::planner",
                key,
                start = %raw.start,
                end = %raw.end,
                "dropping availability window that does not end after it starts"
            ),
        }
    }

    parsed.sort_by_key(|window| window.start);
    let mut accepted: Vec<AvailabilityWindow> = Vec::with_capacity(parsed.len());
    for window in parsed {
        match accepted.last() {
            Some(previous) if window.start < previous.end => warn!(
                target: "app::planner",
                key,
                start = %window.start,
                "dropping availability window overlapping an earlier one"
            ),
            _ => accepted.push(window),
        }
    }
    accepted
}
