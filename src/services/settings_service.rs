use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde_json::json;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::settings::PlannerSettings;
use crate::services::schedule_utils;

const MAX_FOCUS_BLOCK_MINUTES: u32 = 240;

#[derive(Debug, Default, Clone)]
pub struct SettingsUpdateInput {
    pub focus_block_minutes: Option<u32>,
    pub short_break_minutes: Option<u32>,
    pub long_break_minutes: Option<u32>,
    pub blocks_before_long_break: Option<u32>,
    pub default_window_start: Option<String>,
    pub default_window_end: Option<String>,
    pub review_max_minutes: Option<u32>,
    pub review_minutes_per_concept: Option<u32>,
    pub break_overhead_ratio: Option<f64>,
    pub clamp_horizon_days: Option<u32>,
}

/// YAML-backed planner settings with an in-memory cache.
pub struct SettingsService {
    path: PathBuf,
    cache: RwLock<Option<PlannerSettings>>,
}

impl SettingsService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> AppResult<PlannerSettings> {
        if let Ok(guard) = self.cache.read() {
            if let Some(settings) = guard.as_ref() {
                return Ok(settings.clone());
            }
        }

        let settings = self.load_settings_from_file()?;
        if let Ok(mut guard) = self.cache.write() {
            *guard = Some(settings.clone());
        }
        Ok(settings)
    }

    pub fn update(&self, input: SettingsUpdateInput) -> AppResult<PlannerSettings> {
        let mut current = self.get()?;

        if let Some(value) = input.focus_block_minutes {
            ensure_positive("focusBlockMinutes", value)?;
            if value > MAX_FOCUS_BLOCK_MINUTES {
                return Err(AppError::validation_with_details(
                    format!("focus blocks are limited to {MAX_FOCUS_BLOCK_MINUTES} minutes"),
                    json!({ "field": "focusBlockMinutes", "value": value }),
                ));
            }
            current.focus_block_minutes = value;
        }

        if let Some(value) = input.short_break_minutes {
            ensure_positive("shortBreakMinutes", value)?;
            current.short_break_minutes = value;
        }

        if let Some(value) = input.long_break_minutes {
            ensure_positive("longBreakMinutes", value)?;
            current.long_break_minutes = value;
        }

        if let Some(value) = input.blocks_before_long_break {
            ensure_positive("blocksBeforeLongBreak", value)?;
            current.blocks_before_long_break = value;
        }

        if let Some(value) = input.review_max_minutes {
            ensure_positive("reviewMaxMinutes", value)?;
            current.review_max_minutes = value;
        }

        if let Some(value) = input.review_minutes_per_concept {
            ensure_positive("reviewMinutesPerConcept", value)?;
            current.review_minutes_per_concept = value;
        }

        if let Some(value) = input.clamp_horizon_days {
            ensure_positive("clampHorizonDays", value)?;
            current.clamp_horizon_days = value;
        }

        if let Some(ratio) = input.break_overhead_ratio {
            if !(0.0..1.0).contains(&ratio) {
                return Err(AppError::validation_with_details(
                    "break overhead ratio must be in [0, 1)",
                    json!({ "field": "breakOverheadRatio", "value": ratio }),
                ));
            }
            current.break_overhead_ratio = ratio;
        }

        if let Some(start) = input.default_window_start.as_ref() {
            current.default_window_start = normalize_time_field("defaultWindowStart", start)?;
        }

        if let Some(end) = input.default_window_end.as_ref() {
            current.default_window_end = normalize_time_field("defaultWindowEnd", end)?;
        }

        ensure_window_order(&current)?;

        self.persist(&current)?;
        if let Ok(mut guard) = self.cache.write() {
            *guard = Some(current.clone());
        }

        info!(target: "app::settings", path = %self.path.display(), "planner settings updated");
        Ok(current)
    }

    fn persist(&self, settings: &PlannerSettings) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(settings)?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    fn load_settings_from_file(&self) -> AppResult<PlannerSettings> {
        if !self.path.exists() {
            info!(
                target: "app::settings",
                path = %self.path.display(),
                "settings file not found, using defaults"
            );
            return Ok(PlannerSettings::default());
        }

        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(PlannerSettings::default());
        }

        let settings: PlannerSettings = serde_yaml::from_str(&raw)?;
        if ensure_window_order(&settings).is_err() {
            warn!(
                target: "app::settings",
                start = %settings.default_window_start,
                end = %settings.default_window_end,
                "stored default window invalid, falling back to defaults"
            );
            let defaults = PlannerSettings::default();
            return Ok(PlannerSettings {
                default_window_start: defaults.default_window_start,
                default_window_end: defaults.default_window_end,
                ..settings
            });
        }
        Ok(settings)
    }
}

fn ensure_positive(field: &str, value: u32) -> AppResult<()> {
    if value == 0 {
        return Err(AppError::validation_with_details(
            format!("{field} must be greater than zero"),
            json!({ "field": field, "value": value }),
        ));
    }
    Ok(())
}

fn normalize_time_field(field: &str, value: &str) -> AppResult<String> {
    schedule_utils::parse_time(value)
        .map(schedule_utils::format_time)
        .ok_or_else(|| {
            AppError::validation_with_details(
                format!("{field} must use HH:MM"),
                json!({ "field": field, "value": value }),
            )
        })
}

fn ensure_window_order(settings: &PlannerSettings) -> AppResult<()> {
    let start = schedule_utils::parse_time(&settings.default_window_start);
    let end = schedule_utils::parse_time(&settings.default_window_end);
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(()),
        _ => Err(AppError::validation_with_details(
            "default window start must be earlier than its end",
            json!({
                "start": settings.default_window_start,
                "end": settings.default_window_end,
            }),
        )),
    }
}
