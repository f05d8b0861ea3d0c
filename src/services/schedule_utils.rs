use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde_json::json;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};

pub const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Fallback used whenever a window time cannot be parsed.
pub fn default_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Parses a 24-hour `"HH:MM"` string.
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let (hour, minute) = value.trim().split_once(':')?;
    let hour: u32 = hour.trim().parse().ok()?;
    let minute: u32 = minute.trim().parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

pub fn parse_time_or_default(value: &str) -> NaiveTime {
    parse_time(value).unwrap_or_else(|| {
        warn!(target: "app::planner", value, "malformed time string, using 09:00");
        default_time()
    })
}

pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

pub fn minutes_from_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

pub fn to_naive_time(total_minutes: u32) -> NaiveTime {
    let total_minutes = total_minutes.min(MINUTES_PER_DAY - 1);
    NaiveTime::from_hms_opt(total_minutes / 60, total_minutes % 60, 0).unwrap_or(NaiveTime::MIN)
}

/// Minute-of-day arithmetic that refuses to wrap past midnight.
pub fn add_minutes(minute_of_day: u32, minutes: u32) -> Option<u32> {
    minute_of_day
        .checked_add(minutes)
        .filter(|end| *end < MINUTES_PER_DAY)
}

pub fn duration_minutes(start: NaiveTime, end: NaiveTime) -> u32 {
    minutes_from_midnight(end).saturating_sub(minutes_from_midnight(start))
}

/// Half-open interval overlap test.
pub fn overlaps(a_start: NaiveTime, a_end: NaiveTime, b_start: NaiveTime, b_end: NaiveTime) -> bool {
    a_start < b_end && b_start < a_end
}

pub fn parse_weekday(value: &str) -> Option<Weekday> {
    match value.trim().to_lowercase().as_str() {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Applies the invalid-deadline policy: a deadline at or before the start of
/// `start_date` is moved to `clamp_days` after it.
pub fn resolve_deadline(
    start_date: NaiveDate,
    deadline: NaiveDateTime,
    clamp_days: u32,
) -> NaiveDateTime {
    let start = start_of_day(start_date);
    if deadline > start {
        return deadline;
    }
    let corrected = start + Duration::days(i64::from(clamp_days.max(1)));
    debug!(
        target: "app::planner",
        requested = %deadline,
        corrected = %corrected,
        "deadline not after start date, clamping forward"
    );
    corrected
}

/// Whole days between the start of `start_date` and `deadline`, rounded down.
pub fn whole_days_until(start_date: NaiveDate, deadline: NaiveDateTime) -> i64 {
    (deadline - start_of_day(start_date)).num_days()
}

/// Accepts RFC 3339 timestamps (offset dropped, wall-clock kept), naive
/// `YYYY-MM-DDTHH:MM[:SS]` values, and bare dates (midnight).
pub fn parse_deadline(value: &str) -> AppResult<NaiveDateTime> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(start_of_day)
        .map_err(|err| {
            AppError::validation_with_details(
                "invalid deadline format",
                json!({ "value": value, "error": err.to_string() }),
            )
        })
}

/// Serde adapter rendering `NaiveTime` as `"HH:MM"`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_time(*time))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw)
            .ok_or_else(|| de::Error::custom(format!("expected HH:MM, got {raw:?}")))
    }
}
