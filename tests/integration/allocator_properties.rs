use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use edusense_planner_lib::models::availability::{AvailabilityInput, AvailabilityModel, WindowInput};
use edusense_planner_lib::models::concept::{ConceptInput, Difficulty};
use edusense_planner_lib::models::feasibility::FeasibilityBand;
use edusense_planner_lib::models::schedule::ScheduleBlock;
use edusense_planner_lib::models::settings::{PlannerSettings, ScheduleOverrides};
use edusense_planner_lib::services::schedule_service::{
    GeneratedSchedule, StudyPlanRequest, StudyScheduleService,
};
use proptest::prelude::*;

struct Case {
    name: &'static str,
    availability: Option<AvailabilityInput>,
    concepts: Vec<(&'static str, &'static str, i64)>,
    deadline: &'static str,
    overrides: Option<ScheduleOverrides>,
}

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).expect("valid date")
}

fn windows(pairs: &[(&str, &str)]) -> Vec<WindowInput> {
    pairs.iter().map(|(s, e)| WindowInput::new(*s, *e)).collect()
}

fn cases() -> Vec<Case> {
    let mut sparse = AvailabilityInput::new();
    sparse.insert("default".into(), windows(&[("18:00", "19:30")]));
    sparse.insert("saturday".into(), Vec::new());
    sparse.insert("sunday".into(), Vec::new());

    let mut split_day = AvailabilityInput::new();
    split_day.insert(
        "default".into(),
        windows(&[("08:00", "10:00"), ("13:00", "15:30"), ("19:00", "20:00")]),
    );

    let mut narrow = AvailabilityInput::new();
    narrow.insert("default".into(), windows(&[("09:00", "09:40")]));

    let mut mixed = AvailabilityInput::new();
    mixed.insert("monday".into(), windows(&[("07:00", "08:00"), ("20:00", "22:30")]));
    mixed.insert("Wed".into(), windows(&[("10:00", "16:00")]));
    mixed.insert("friday".into(), Vec::new());

    vec![
        Case {
            name: "default window",
            availability: None,
            concepts: vec![
                ("a", "medium", 95),
                ("b", "hard", 120),
                ("c", "easy", 40),
                ("d", "hard", 35),
                ("e", "medium", 200),
            ],
            deadline: "2025-03-06",
            overrides: None,
        },
        Case {
            name: "sparse evenings",
            availability: Some(sparse),
            concepts: vec![("a", "hard", 300), ("b", "easy", 90), ("c", "medium", 150)],
            deadline: "2025-03-13",
            overrides: None,
        },
        Case {
            name: "split day",
            availability: Some(split_day),
            concepts: vec![
                ("a", "hard", 170),
                ("b", "hard", 170),
                ("c", "medium", 60),
                ("d", "easy", 15),
            ],
            deadline: "2025-03-07T14:00:00",
            overrides: None,
        },
        Case {
            name: "window shorter than a focus block",
            availability: Some(narrow),
            concepts: vec![("a", "hard", 45), ("b", "easy", 30)],
            deadline: "2025-03-06",
            overrides: None,
        },
        Case {
            name: "mixed weekdays",
            availability: Some(mixed),
            concepts: vec![("a", "easy", 60), ("b", "hard", 240), ("c", "medium", 25)],
            deadline: "2025-03-10",
            overrides: None,
        },
        Case {
            name: "short focus blocks",
            availability: None,
            concepts: vec![("a", "medium", 100), ("b", "hard", 80)],
            deadline: "2025-03-05T10:30:00",
            overrides: Some(ScheduleOverrides {
                focus_block_minutes: Some(25),
                short_break_minutes: Some(5),
                long_break_minutes: Some(15),
                blocks_before_long_break: Some(2),
            }),
        },
    ]
}

fn concept_inputs(concepts: &[(&str, &str, i64)]) -> Vec<ConceptInput> {
    concepts
        .iter()
        .map(|(id, difficulty, minutes)| ConceptInput {
            id: (*id).into(),
            title: format!("Concept {id}"),
            difficulty: Some((*difficulty).into()),
            estimated_minutes: *minutes,
            ..Default::default()
        })
        .collect()
}

fn generate(
    concepts: &[ConceptInput],
    availability: Option<&AvailabilityInput>,
    deadline: &str,
    overrides: Option<ScheduleOverrides>,
) -> (GeneratedSchedule, AvailabilityModel) {
    let request = StudyPlanRequest {
        concepts: concepts.to_vec(),
        deadline: deadline.into(),
        availability: availability.cloned(),
        start_date: Some(start_date()),
        overrides,
        ..Default::default()
    };

    let settings = PlannerSettings::default();
    let model = match availability {
        Some(input) => AvailabilityModel::from_input(input).or_default_window(settings.default_window()),
        None => settings.default_availability(),
    };
    let schedule = StudyScheduleService::with_defaults()
        .generate(request)
        .unwrap_or_else(|err| panic!("{deadline}: {err}"));
    (schedule, model)
}

fn run(case: &Case) -> (Vec<ConceptInput>, GeneratedSchedule, AvailabilityModel) {
    let concepts = concept_inputs(&case.concepts);
    let (schedule, model) =
        generate(&concepts, case.availability.as_ref(), case.deadline, case.overrides);
    (concepts, schedule, model)
}

fn by_date(blocks: &[ScheduleBlock]) -> BTreeMap<NaiveDate, Vec<&ScheduleBlock>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<&ScheduleBlock>> = BTreeMap::new();
    for block in blocks {
        grouped.entry(block.date).or_default().push(block);
    }
    for day in grouped.values_mut() {
        day.sort_by_key(|b| b.start_time);
    }
    grouped
}

fn assert_no_overlap(label: &str, schedule: &GeneratedSchedule) {
    for (date, day) in by_date(&schedule.blocks) {
        for pair in day.windows(2) {
            assert!(
                pair[0].end_time <= pair[1].start_time,
                "{label}: overlap on {date}: {:?} / {:?}",
                pair[0],
                pair[1]
            );
        }
    }
    assert!(schedule.blocks.iter().all(|b| b.start_time < b.end_time), "{label}");
}

fn assert_contained(label: &str, schedule: &GeneratedSchedule, model: &AvailabilityModel) {
    for block in &schedule.blocks {
        let contained = model
            .windows_for(block.date.weekday())
            .iter()
            .any(|w| w.contains(block.start_time, block.end_time));
        assert!(contained, "{label}: {:?} escapes its windows", block);
    }
}

fn assert_minutes_match(label: &str, concepts: &[ConceptInput], schedule: &GeneratedSchedule) {
    for id in &schedule.scheduled_concept_ids {
        let expected = concepts
            .iter()
            .find(|c| c.id == *id)
            .map(|c| c.estimated_minutes as u32)
            .expect("known concept");
        let placed: u32 = schedule
            .blocks
            .iter()
            .filter(|b| b.concept_id() == Some(id.as_str()))
            .map(ScheduleBlock::duration_minutes)
            .sum();
        assert_eq!(placed, expected, "{label}: concept {id}");
    }
}

fn assert_harder_first(label: &str, concepts: &[ConceptInput], schedule: &GeneratedSchedule) {
    let first_start = |id: &str| {
        schedule
            .blocks
            .iter()
            .filter(|b| b.concept_id() == Some(id))
            .map(|b| (b.date, b.start_time))
            .min()
    };
    let difficulty = |id: &str| {
        let raw = concepts
            .iter()
            .find(|c| c.id == id)
            .and_then(|c| c.difficulty.as_deref());
        Difficulty::from_label(raw)
    };

    for a in &schedule.scheduled_concept_ids {
        for b in &schedule.scheduled_concept_ids {
            if difficulty(a.as_str()).weight() > difficulty(b.as_str()).weight() {
                assert!(
                    first_start(a.as_str()) <= first_start(b.as_str()),
                    "{label}: {a} vs {b}"
                );
            }
        }
    }
}

fn assert_break_cadence(label: &str, schedule: &GeneratedSchedule, overrides: Option<ScheduleOverrides>) {
    let limit = overrides
        .and_then(|o| o.blocks_before_long_break)
        .unwrap_or(3);
    for (date, day) in by_date(&schedule.blocks) {
        let mut run_length = 0;
        for block in day {
            if block.is_break() {
                run_length = 0;
            } else if block.is_study() {
                run_length += 1;
                assert!(run_length <= limit, "{label}: {run_length} in a row on {date}");
            }
        }
    }
}

fn assert_feasibility_verdict(label: &str, schedule: &GeneratedSchedule) {
    let report = &schedule.feasibility;
    assert!(report.utilization_percentage >= 0.0, "{label}");
    assert_eq!(
        report.feasible,
        report.band != FeasibilityBand::NotFeasible,
        "{label}: {report:?}"
    );
    // The utilization identity only holds while there is capacity to divide by.
    if report.available_minutes > 0 {
        assert_eq!(report.feasible, report.utilization_percentage <= 100.0, "{label}");
    } else if report.total_study_minutes > 0 {
        assert!(!report.feasible, "{label}");
    }
}

#[test]
fn blocks_never_overlap_on_the_same_date() {
    for case in cases() {
        let (_, schedule, _) = run(&case);
        assert_no_overlap(case.name, &schedule);
    }
}

#[test]
fn blocks_stay_inside_availability_windows() {
    for case in cases() {
        let (_, schedule, model) = run(&case);
        assert_contained(case.name, &schedule, &model);
    }
}

#[test]
fn fully_scheduled_concepts_get_exactly_their_minutes() {
    for case in cases() {
        let (concepts, schedule, _) = run(&case);
        assert_minutes_match(case.name, &concepts, &schedule);
    }
}

#[test]
fn harder_concepts_start_no_later_than_easier_ones() {
    for case in cases() {
        let (concepts, schedule, _) = run(&case);
        assert_harder_first(case.name, &concepts, &schedule);
    }
}

#[test]
fn at_most_three_study_blocks_run_without_a_break() {
    for case in cases() {
        let (_, schedule, _) = run(&case);
        assert_break_cadence(case.name, &schedule, case.overrides);
    }
}

#[test]
fn feasibility_verdict_matches_utilization() {
    for case in cases() {
        let (_, schedule, _) = run(&case);
        assert_feasibility_verdict(case.name, &schedule);
    }
}

#[test]
fn allocation_is_deterministic() {
    for case in cases() {
        let (_, first, _) = run(&case);
        let (_, second, _) = run(&case);
        assert_eq!(
            serde_json::to_vec(&first.blocks).expect("json"),
            serde_json::to_vec(&second.blocks).expect("json"),
            "{}",
            case.name
        );
        assert_eq!(first, second, "{}", case.name);
    }
}

const DIFFICULTIES: [&str; 3] = ["easy", "medium", "hard"];

#[derive(Debug, Clone)]
struct GeneratedPlan {
    concepts: Vec<ConceptInput>,
    availability: AvailabilityInput,
    deadline: String,
    overrides: Option<ScheduleOverrides>,
}

fn concepts_strategy() -> impl Strategy<Value = Vec<ConceptInput>> {
    prop::collection::vec((0usize..3, 1i64..=300), 0..7).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (difficulty, minutes))| ConceptInput {
                id: format!("c{i}"),
                title: format!("Concept {i}"),
                difficulty: Some(DIFFICULTIES[difficulty].into()),
                estimated_minutes: minutes,
                ..Default::default()
            })
            .collect()
    })
}

fn window_strategy() -> impl Strategy<Value = (String, String)> {
    (5u32..=18, 0u32..4, 20u32..=300).prop_map(|(hour, quarter, length)| {
        let start = hour * 60 + quarter * 15;
        let end = start + length;
        (
            format!("{:02}:{:02}", start / 60, start % 60),
            format!("{:02}:{:02}", end / 60, end % 60),
        )
    })
}

fn overrides_strategy() -> impl Strategy<Value = Option<ScheduleOverrides>> {
    prop::option::of((15u32..=90, 5u32..=15, 10u32..=30, 1u32..=4).prop_map(
        |(focus, short, long, before_long)| ScheduleOverrides {
            focus_block_minutes: Some(focus),
            short_break_minutes: Some(short),
            long_break_minutes: Some(long),
            blocks_before_long_break: Some(before_long),
        },
    ))
}

fn plan_strategy() -> impl Strategy<Value = GeneratedPlan> {
    (
        concepts_strategy(),
        prop::collection::vec(window_strategy(), 0..3),
        prop::option::of(window_strategy()),
        1i64..=10,
        prop::option::of(0u32..24),
        overrides_strategy(),
    )
        .prop_map(|(concepts, default_windows, monday, days, hour, overrides)| {
            let mut availability = AvailabilityInput::new();
            availability.insert(
                "default".into(),
                default_windows
                    .iter()
                    .map(|(s, e)| WindowInput::new(s.as_str(), e.as_str()))
                    .collect(),
            );
            if let Some((s, e)) = monday {
                availability.insert("monday".into(), vec![WindowInput::new(s.as_str(), e.as_str())]);
            }

            let date = (start_date() + Duration::days(days)).format("%Y-%m-%d");
            let deadline = match hour {
                Some(hour) => format!("{date}T{hour:02}:00:00"),
                None => date.to_string(),
            };
            GeneratedPlan {
                concepts,
                availability,
                deadline,
                overrides,
            }
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn allocator_invariants_hold_for_generated_plans(plan in plan_strategy()) {
        let label = plan.deadline.as_str();
        let (schedule, model) = generate(
            &plan.concepts,
            Some(&plan.availability),
            &plan.deadline,
            plan.overrides,
        );

        assert_no_overlap(label, &schedule);
        assert_contained(label, &schedule, &model);
        assert_minutes_match(label, &plan.concepts, &schedule);
        assert_harder_first(label, &plan.concepts, &schedule);
        assert_break_cadence(label, &schedule, plan.overrides);
        assert_feasibility_verdict(label, &schedule);

        let (again, _) = generate(
            &plan.concepts,
            Some(&plan.availability),
            &plan.deadline,
            plan.overrides,
        );
        prop_assert_eq!(&schedule, &again);
        prop_assert_eq!(
            schedule.scheduled_concept_ids.len() + schedule.unplaced_concept_ids.len(),
            plan.concepts.len()
        );
    }
}
