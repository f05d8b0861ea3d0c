use chrono::{Duration, NaiveDate, NaiveTime};
use edusense_planner_lib::commands::planning::{plan_feasibility, plan_generate};
use edusense_planner_lib::commands::settings::{settings_update, SettingsUpdatePayload};
use edusense_planner_lib::commands::AppState;
use edusense_planner_lib::models::availability::{AvailabilityInput, WindowInput};
use edusense_planner_lib::models::concept::ConceptInput;
use edusense_planner_lib::models::schedule::{BlockKind, BreakLength};
use edusense_planner_lib::models::timeline::MilestonePhase;
use edusense_planner_lib::services::schedule_service::{StudyPlanRequest, StudyScheduleService};
use serde_json::{json, Value};
use tempfile::tempdir;

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).expect("valid date")
}

fn t(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

fn concept(id: &str, difficulty: &str, minutes: i64) -> ConceptInput {
    ConceptInput {
        id: id.into(),
        title: format!("Topic {id}"),
        difficulty: Some(difficulty.into()),
        estimated_minutes: minutes,
        key_points: vec![format!("{id} definitions"), format!("{id} examples")],
        ..Default::default()
    }
}

fn request(concepts: Vec<ConceptInput>, deadline: &str) -> StudyPlanRequest {
    StudyPlanRequest {
        goal_title: Some("Biology midterm".into()),
        concepts,
        deadline: deadline.into(),
        start_date: Some(monday()),
        ..Default::default()
    }
}

#[test]
fn three_concepts_over_two_days_front_load_the_hard_topic() {
    let service = StudyScheduleService::with_defaults();
    let schedule = service
        .generate(request(
            vec![
                concept("hard", "hard", 60),
                concept("easy", "easy", 30),
                concept("medium", "medium", 45),
            ],
            "2025-03-05",
        ))
        .expect("schedule");

    assert_eq!(
        schedule.scheduled_concept_ids,
        vec!["hard".to_string(), "medium".to_string(), "easy".to_string()]
    );
    assert!(schedule.is_complete());

    let first = &schedule.blocks[0];
    assert_eq!((first.date, first.start_time), (monday(), t(9, 0)));
    assert_eq!(first.concept_id(), Some("hard"));

    let long_break = schedule
        .blocks
        .iter()
        .find(|b| matches!(b.kind, BlockKind::Break { length: BreakLength::Long }))
        .expect("long break after three study blocks");
    assert_eq!((long_break.start_time, long_break.end_time), (t(11, 5), t(11, 25)));

    let review = schedule.blocks.iter().find(|b| b.is_review()).expect("review block");
    assert_eq!(review.date, monday() + Duration::days(1));
    assert_eq!((review.start_time, review.end_time), (t(9, 0), t(9, 30)));

    let timeline = schedule.timeline.expect("timeline");
    assert_eq!(timeline.goal_title, "Biology midterm");
    assert_eq!(timeline.days_remaining, 2);
    let phases: Vec<_> = timeline.milestones.iter().map(|m| m.phase).collect();
    assert_eq!(
        phases,
        vec![MilestonePhase::Foundation, MilestonePhase::Core, MilestonePhase::FinalReview]
    );

    assert!(schedule.feasibility.feasible);
    assert_eq!(schedule.feasibility.total_study_minutes, 135);
    assert_eq!(schedule.daily_sessions.len(), 2);
    assert_eq!(schedule.daily_sessions[1].topics, vec!["Comprehensive Review".to_string()]);
}

#[test]
fn empty_monday_pushes_work_to_tuesday() {
    let mut availability = AvailabilityInput::new();
    availability.insert("Monday".into(), Vec::new());
    let mut req = request(vec![concept("cells", "medium", 40)], "2025-03-05");
    req.availability = Some(availability);

    let schedule = StudyScheduleService::with_defaults()
        .generate(req)
        .expect("schedule");

    assert!(schedule.blocks.iter().all(|b| b.date != monday()));
    let first = &schedule.blocks[0];
    assert_eq!((first.date, first.start_time), (monday() + Duration::days(1), t(9, 0)));
    assert_eq!(schedule.scheduled_concept_ids, vec!["cells".to_string()]);
}

#[test]
fn long_concept_splits_into_four_focus_blocks_on_one_day() {
    let schedule = StudyScheduleService::with_defaults()
        .generate(request(vec![concept("essay", "hard", 200)], "2025-03-06"))
        .expect("schedule");

    let parts: Vec<_> = schedule
        .blocks
        .iter()
        .filter(|b| b.concept_id() == Some("essay"))
        .collect();
    assert_eq!(parts.len(), 4);
    assert!(parts.iter().all(|b| b.duration_minutes() == 50 && b.date == monday()));

    for pair in parts.windows(2) {
        let between = schedule
            .blocks
            .iter()
            .filter(|b| b.is_break() && b.start_time >= pair[0].end_time && b.end_time <= pair[1].start_time)
            .count();
        assert_eq!(between, 1, "every pair of sub-blocks is separated by a break");
    }
}

#[test]
fn regenerating_yields_identical_output() {
    let service = StudyScheduleService::with_defaults();
    let build = || {
        service
            .generate(request(
                vec![concept("a", "medium", 130), concept("b", "hard", 75), concept("c", "easy", 20)],
                "2025-03-08T12:00:00",
            ))
            .expect("schedule")
    };

    let first = build();
    let second = build();
    assert_eq!(first.fingerprint, second.fingerprint);
    assert_eq!(
        serde_json::to_string(&first.blocks).expect("json"),
        serde_json::to_string(&second.blocks).expect("json")
    );
}

#[test]
fn command_layer_round_trips_json_payloads() {
    let dir = tempdir().expect("temp dir");
    let state = AppState::new(dir.path().join("planner.yaml"));

    let payload = json!({
        "goalTitle": "Algorithms final",
        "startDate": "2025-03-03",
        "deadline": "2025-03-07T18:00:00",
        "availability": {
            "default": [{ "start": "18:00", "end": "21:00" }],
            "saturday": []
        },
        "concepts": [
            { "id": "dp", "title": "Dynamic programming", "difficulty": "hard", "estimatedMinutes": 90 },
            { "id": "sort", "title": "Sorting", "estimatedMinutes": 30 }
        ]
    })
    .to_string();

    let schedule = plan_generate(&state, &payload).expect("plan");
    let rendered: Value = serde_json::to_value(&schedule).expect("json");
    let first = &rendered["blocks"][0];
    assert_eq!(first["type"], "study");
    assert_eq!(first["conceptId"], "dp");
    assert_eq!(first["startTime"], "18:00");
    assert_eq!(first["date"], "2025-03-03");
    assert_eq!(rendered["timeline"]["goalTitle"], "Algorithms final");

    let report = plan_feasibility(&state, &payload).expect("feasibility");
    assert_eq!(report, schedule.feasibility);
    // six 3h evenings a week, scaled to 5 days, minus the 20% reserve
    assert_eq!(report.available_minutes, 617);
    assert_eq!(report.days_available, 5);
}

#[test]
fn updated_settings_change_the_focus_block() {
    let dir = tempdir().expect("temp dir");
    let state = AppState::new(dir.path().join("planner.yaml"));
    settings_update(
        &state,
        SettingsUpdatePayload {
            focus_block_minutes: Some(30),
            ..Default::default()
        },
    )
    .expect("settings update");

    let payload = json!({
        "startDate": "2025-03-03",
        "deadline": "2025-03-05",
        "concepts": [{ "id": "a", "title": "Atoms", "difficulty": "easy", "estimatedMinutes": 60 }]
    })
    .to_string();

    let schedule = plan_generate(&state, &payload).expect("plan");
    let study: Vec<_> = schedule.blocks.iter().filter(|b| b.is_study()).collect();
    assert_eq!(study.len(), 2);
    assert!(study.iter().all(|b| b.duration_minutes() == 30));
}
