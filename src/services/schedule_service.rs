use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::availability::{AvailabilityInput, AvailabilityModel};
use crate::models::concept::{Concept, ConceptInput};
use crate::models::feasibility::FeasibilityReport;
use crate::models::schedule::ScheduleBlock;
use crate::models::session::StudySession;
use crate::models::settings::{AllocationPolicy, PlannerSettings, ScheduleOverrides};
use crate::models::timeline::TimelinePlan;
use crate::services::block_allocator::BlockAllocator;
use crate::services::concept_ranker::{ConceptRanker, PassthroughRanker, RankQuery};
use crate::services::feasibility_service;
use crate::services::review_planner::{self, ReviewPlanner};
use crate::services::schedule_utils;
use crate::services::session_summary;
use crate::utils::fingerprint;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlanRequest {
    #[serde(default)]
    pub goal_title: Option<String>,
    #[serde(default)]
    pub concepts: Vec<ConceptInput>,
    pub deadline: String,
    #[serde(default)]
    pub availability: Option<AvailabilityInput>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub overrides: Option<ScheduleOverrides>,
    #[serde(default)]
    pub query: Option<RankQuery>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSchedule {
    pub blocks: Vec<ScheduleBlock>,
    pub timeline: Option<TimelinePlan>,
    pub feasibility: FeasibilityReport,
    pub scheduled_concept_ids: Vec<String>,
    pub unplaced_concept_ids: Vec<String>,
    pub daily_sessions: Vec<StudySession>,
    pub fingerprint: String,
}

impl GeneratedSchedule {
    pub fn is_complete(&self) -> bool {
        self.unplaced_concept_ids.is_empty()
    }
}

/// Request after boundary validation; every engine input is typed.
struct PreparedRequest {
    goal_title: Option<String>,
    concepts: Vec<Concept>,
    start_date: NaiveDate,
    deadline: NaiveDateTime,
    availability: AvailabilityModel,
    policy: AllocationPolicy,
}

#[derive(Clone)]
pub struct StudyScheduleService {
    ranker: Arc<dyn ConceptRanker>,
    settings: PlannerSettings,
}

impl StudyScheduleService {
    pub fn new(ranker: Arc<dyn ConceptRanker>, settings: PlannerSettings) -> Self {
        Self { ranker, settings }
    }

    pub fn with_defaults() -> Self {
        Self::new(Arc::new(PassthroughRanker), PlannerSettings::default())
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    pub fn generate(&self, request: StudyPlanRequest) -> AppResult<GeneratedSchedule> {
        let prepared = self.prepare(request)?;
        let PreparedRequest {
            goal_title,
            concepts,
            start_date,
            deadline,
            availability,
            policy,
        } = prepared;

        let effective_deadline =
            schedule_utils::resolve_deadline(start_date, deadline, policy.clamp_horizon_days);

        let outcome = BlockAllocator::new(&availability, policy).allocate(
            &concepts,
            start_date,
            effective_deadline,
        );
        if let Some(concept_id) = outcome.partially_placed.as_deref() {
            warn!(
                target: "app::planner",
                concept_id,
                "deadline reached while a concept was only partly scheduled"
            );
        }

        let review = ReviewPlanner::new(&availability, policy).plan_review(
            &outcome.scheduled,
            &outcome.blocks,
            start_date,
            effective_deadline,
        );

        let mut blocks = outcome.blocks;
        if let Some(review) = review.clone() {
            blocks.push(review);
        }
        blocks.sort_by(|a, b| (a.date, a.start_time).cmp(&(b.date, b.start_time)));

        let timeline = (!concepts.is_empty()).then(|| {
            review_planner::build_timeline(
                goal_title.as_deref(),
                start_date,
                effective_deadline,
                concepts.len(),
                outcome.unplaced.len(),
                review.as_ref(),
            )
        });

        let feasibility = feasibility_service::validate_schedule_feasibility(
            &concepts,
            deadline,
            &availability,
            start_date,
            &policy,
        );
        let daily_sessions = session_summary::summarize_sessions(&blocks, start_date);
        let fingerprint = fingerprint::schedule_fingerprint(&blocks)?;

        let schedule = GeneratedSchedule {
            scheduled_concept_ids: outcome.scheduled.iter().map(|c| c.id.clone()).collect(),
            unplaced_concept_ids: outcome.unplaced.iter().map(|c| c.id.clone()).collect(),
            blocks,
            timeline,
            feasibility,
            daily_sessions,
            fingerprint,
        };

        info!(
            target: "app::planner",
            blocks = schedule.blocks.len(),
            scheduled = schedule.scheduled_concept_ids.len(),
            unplaced = schedule.unplaced_concept_ids.len(),
            utilization = schedule.feasibility.utilization_percentage,
            "study schedule generated"
        );
        Ok(schedule)
    }

    pub fn check_feasibility(&self, request: StudyPlanRequest) -> AppResult<FeasibilityReport> {
        let prepared = self.prepare(request)?;
        Ok(feasibility_service::validate_schedule_feasibility(
            &prepared.concepts,
            prepared.deadline,
            &prepared.availability,
            prepared.start_date,
            &prepared.policy,
        ))
    }

    fn prepare(&self, request: StudyPlanRequest) -> AppResult<PreparedRequest> {
        let deadline = schedule_utils::parse_deadline(&request.deadline)?;
        let concepts = decode_concepts(request.concepts)?;
        let concepts = match request.query.as_ref() {
            Some(query) => self.rank(query, concepts),
            None => concepts,
        };

        let availability = match request.availability.as_ref().filter(|map| !map.is_empty()) {
            Some(input) => {
                AvailabilityModel::from_input(input).or_default_window(self.settings.default_window())
            }
            None => self.settings.default_availability(),
        };
        let policy = AllocationPolicy::resolve(&self.settings, &request.overrides.unwrap_or_default());
        let start_date = request
            .start_date
            .unwrap_or_else(|| Local::now().date_naive());

        Ok(PreparedRequest {
            goal_title: request.goal_title,
            concepts,
            start_date,
            deadline,
            availability,
            policy,
        })
    }

    fn rank(&self, query: &RankQuery, concepts: Vec<Concept>) -> Vec<Concept> {
        match self.ranker.rank(query, &concepts) {
            Ok(ranked) => {
                debug!(
                    target: "app::planner::ranker",
                    ranker = self.ranker.name(),
                    selected = ranked.len(),
                    candidates = concepts.len(),
                    "concepts ranked"
                );
                ranked.into_iter().map(|entry| entry.concept).collect()
            }
            Err(err) => {
                warn!(
                    target: "app::planner::ranker",
                    ranker = self.ranker.name(),
                    error = %err,
                    "concept ranking failed, keeping input order"
                );
                concepts
            }
        }
    }
}

fn decode_concepts(inputs: Vec<ConceptInput>) -> AppResult<Vec<Concept>> {
    let mut seen = HashSet::with_capacity(inputs.len());
    let mut concepts = Vec::with_capacity(inputs.len());
    for input in inputs {
        let concept = Concept::try_from(input)?;
        if !seen.insert(concept.id.clone()) {
            return Err(AppError::validation_with_details(
                "duplicate concept id",
                json!({ "conceptId": concept.id }),
            ));
        }
        concepts.push(concept);
    }
    Ok(concepts)
}
