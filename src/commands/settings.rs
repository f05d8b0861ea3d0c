use serde::Deserialize;

use crate::models::settings::PlannerSettings;
use crate::services::settings_service::SettingsUpdateInput;

use super::{AppState, CommandResult};

pub fn settings_get(state: &AppState) -> CommandResult<PlannerSettings> {
    Ok(state.settings().get()?)
}

pub fn settings_update(
    state: &AppState,
    payload: SettingsUpdatePayload,
) -> CommandResult<PlannerSettings> {
    Ok(state.settings().update(payload.into_input())?)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdatePayload {
    #[serde(default)]
    pub focus_block_minutes: Option<u32>,
    #[serde(default)]
    pub short_break_minutes: Option<u32>,
    #[serde(default)]
    pub long_break_minutes: Option<u32>,
    #[serde(default)]
    pub blocks_before_long_break: Option<u32>,
    #[serde(default)]
    pub default_window_start: Option<String>,
    #[serde(default)]
    pub default_window_end: Option<String>,
    #[serde(default)]
    pub review_max_minutes: Option<u32>,
    #[serde(default)]
    pub review_minutes_per_concept: Option<u32>,
    #[serde(default)]
    pub break_overhead_ratio: Option<f64>,
    #[serde(default)]
    pub clamp_horizon_days: Option<u32>,
}

impl SettingsUpdatePayload {
    fn into_input(self) -> SettingsUpdateInput {
        SettingsUpdateInput {
            focus_block_minutes: self.focus_block_minutes,
            short_break_minutes: self.short_break_minutes,
            long_break_minutes: self.long_break_minutes,
            blocks_before_long_break: self.blocks_before_long_break,
            default_window_start: self.default_window_start,
            default_window_end: self.default_window_end,
            review_max_minutes: self.review_max_minutes,
            review_minutes_per_concept: self.review_minutes_per_concept,
            break_overhead_ratio: self.break_overhead_ratio,
            clamp_horizon_days: self.clamp_horizon_days,
        }
    }
}
