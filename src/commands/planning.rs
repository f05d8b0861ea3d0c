use crate::models::feasibility::FeasibilityReport;
use crate::services::schedule_service::{GeneratedSchedule, StudyPlanRequest};

use super::{AppState, CommandError, CommandResult};

pub fn plan_generate(state: &AppState, payload: &str) -> CommandResult<GeneratedSchedule> {
    let request = parse_request(payload)?;
    let service = state.schedule()?;
    Ok(service.generate(request)?)
}

pub fn plan_feasibility(state: &AppState, payload: &str) -> CommandResult<FeasibilityReport> {
    let request = parse_request(payload)?;
    let service = state.schedule()?;
    Ok(service.check_feasibility(request)?)
}

fn parse_request(payload: &str) -> Result<StudyPlanRequest, CommandError> {
    serde_json::from_str(payload).map_err(|err| {
        CommandError::new(
            "INVALID_PAYLOAD",
            "request is not a valid study plan payload",
            Some(serde_json::json!({
                "line": err.line(),
                "column": err.column(),
                "error": err.to_string(),
            })),
        )
    })
}
