use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum FocusLevel {
    Low,
    Medium,
    High,
}

impl FocusLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FocusLevel::Low => "low",
            FocusLevel::Medium => "medium",
            FocusLevel::High => "high",
        }
    }
}

impl fmt::Display for FocusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One calendar day of the plan, rolled up from its blocks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub day: u32,
    pub date: NaiveDate,
    pub day_name: String,
    pub topics: Vec<String>,
    pub duration_hours: f64,
    pub focus_level: FocusLevel,
    pub tips: String,
}
