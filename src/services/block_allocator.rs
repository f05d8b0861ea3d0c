//! Walks calendar days and availability windows, packing ordered concepts into
//! focus-sized study blocks with short and long breaks in between.
//!
//! The walk is an explicit state machine:
//!
//! ```text
//! AdvancingDay -> ResolvingWindow -> PlacingBlock -> (LongBreak | StudyBlock [+ ShortBreak])
//!                        ^                |
//!                        +----------------+ (window exhausted / block does not fit)
//! ```
//!
//! Break insertion lives in [`FocusSequencer`] so it can be exercised without
//! any calendar arithmetic.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use crate::models::availability::{AvailabilityModel, AvailabilityWindow};
use crate::models::concept::Concept;
use crate::models::schedule::{BlockKind, BreakLength, ScheduleBlock};
use crate::models::settings::AllocationPolicy;
use crate::services::{ordering, schedule_utils};

/// What the sequencer asks the walker to try next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    LongBreak(u32),
    StudyBlock(u32),
}

/// Break-insertion policy: counts consecutive study blocks and decides when a
/// short or long break is due.
#[derive(Debug, Clone)]
pub struct FocusSequencer {
    focus_block_minutes: u32,
    short_break_minutes: u32,
    long_break_minutes: u32,
    blocks_before_long_break: u32,
    consecutive_blocks: u32,
}

impl FocusSequencer {
    pub fn new(policy: &AllocationPolicy) -> Self {
        Self {
            focus_block_minutes: policy.focus_block_minutes.max(1),
            short_break_minutes: policy.short_break_minutes,
            long_break_minutes: policy.long_break_minutes,
            blocks_before_long_break: policy.blocks_before_long_break.max(1),
            consecutive_blocks: 0,
        }
    }

    pub fn consecutive_blocks(&self) -> u32 {
        self.consecutive_blocks
    }

    /// Next placement for a concept with `remaining_minutes` still to study.
    pub fn next_placement(&self, remaining_minutes: u32) -> Placement {
        if self.consecutive_blocks >= self.blocks_before_long_break {
            Placement::LongBreak(self.long_break_minutes)
        } else {
            Placement::StudyBlock(remaining_minutes.min(self.focus_block_minutes))
        }
    }

    pub fn record_study_block(&mut self) {
        self.consecutive_blocks += 1;
    }

    pub fn record_long_break(&mut self) {
        self.consecutive_blocks = 0;
    }

    /// Short break after a study block, unless the long-break threshold was just
    /// reached or nothing is left to study.
    pub fn short_break_after_study(&self, more_work: bool) -> Option<u32> {
        (more_work && self.consecutive_blocks < self.blocks_before_long_break)
            .then_some(self.short_break_minutes)
            .filter(|minutes| *minutes > 0)
    }

    pub fn start_new_day(&mut self) {
        self.consecutive_blocks = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocatorState {
    AdvancingDay,
    ResolvingWindow { index: usize },
    PlacingBlock { index: usize },
    Finished,
}

/// Result of one allocation walk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationOutcome {
    /// Sorted by date, then start time.
    pub blocks: Vec<ScheduleBlock>,
    /// Concepts whose full duration was emitted, in scheduling order.
    pub scheduled: Vec<Concept>,
    /// Concepts not fully placed before the deadline, in scheduling order.
    pub unplaced: Vec<Concept>,
    /// Concept that received some but not all of its sub-blocks.
    pub partially_placed: Option<String>,
    pub days_walked: u32,
}

impl AllocationOutcome {
    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }
}

pub struct BlockAllocator<'a> {
    availability: &'a AvailabilityModel,
    policy: AllocationPolicy,
}

impl<'a> BlockAllocator<'a> {
    pub fn new(availability: &'a AvailabilityModel, policy: AllocationPolicy) -> Self {
        Self {
            availability,
            policy,
        }
    }

    /// `deadline` must already have the invalid-deadline policy applied.
    pub fn allocate(
        &self,
        concepts: &[Concept],
        start_date: NaiveDate,
        deadline: NaiveDateTime,
    ) -> AllocationOutcome {
        if concepts.is_empty() {
            debug!(target: "app::planner::allocator", "no concepts to allocate");
            return AllocationOutcome::default();
        }

        let ordered = ordering::order_concepts(concepts);
        let mut walker = ScheduleWalker::new(&ordered, self.availability, &self.policy, start_date, deadline);
        walker.run();
        let outcome = walker.into_outcome();

        info!(
            target: "app::planner::allocator",
            blocks = outcome.blocks.len(),
            scheduled = outcome.scheduled.len(),
            unplaced = outcome.unplaced.len(),
            days_walked = outcome.days_walked,
            "allocation finished"
        );
        outcome
    }
}

struct ScheduleWalker<'a> {
    concepts: &'a [Concept],
    availability: &'a AvailabilityModel,
    deadline: NaiveDateTime,
    sequencer: FocusSequencer,
    current_date: NaiveDate,
    day_windows: Vec<AvailabilityWindow>,
    clock: u32,
    window_end: u32,
    concept_index: usize,
    remaining_minutes: u32,
    part: u32,
    days_walked: u32,
    blocks: Vec<ScheduleBlock>,
}

impl<'a> ScheduleWalker<'a> {
    fn new(
        concepts: &'a [Concept],
        availability: &'a AvailabilityModel,
        policy: &AllocationPolicy,
        start_date: NaiveDate,
        deadline: NaiveDateTime,
    ) -> Self {
        Self {
            concepts,
            availability,
            deadline,
            sequencer: FocusSequencer::new(policy),
            current_date: start_date,
            day_windows: Vec::new(),
            clock: 0,
            window_end: 0,
            concept_index: 0,
            remaining_minutes: concepts.first().map(|c| c.estimated_minutes).unwrap_or(0),
            part: 0,
            days_walked: 0,
            blocks: Vec::new(),
        }
    }

    fn run(&mut self) {
        let mut state = AllocatorState::AdvancingDay;
        while state != AllocatorState::Finished {
            state = self.step(state);
        }
    }

    fn step(&mut self, state: AllocatorState) -> AllocatorState {
        match state {
            AllocatorState::AdvancingDay => self.enter_day(),
            AllocatorState::ResolvingWindow { index } => self.resolve_window(index),
            AllocatorState::PlacingBlock { index } => self.place_block(index),
            AllocatorState::Finished => AllocatorState::Finished,
        }
    }

    fn all_placed(&self) -> bool {
        self.concept_index >= self.concepts.len()
    }

    fn enter_day(&mut self) -> AllocatorState {
        if self.all_placed() || schedule_utils::start_of_day(self.current_date) >= self.deadline {
            return AllocatorState::Finished;
        }

        self.days_walked += 1;
        self.sequencer.start_new_day();
        self.day_windows = self
            .availability
            .windows_for(self.current_date.weekday())
            .to_vec();

        if self.day_windows.is_empty() {
            debug!(
                target: "app::planner::allocator",
                date = %self.current_date,
                "no availability, skipping day"
            );
            self.next_day();
            return AllocatorState::AdvancingDay;
        }

        AllocatorState::ResolvingWindow { index: 0 }
    }

    fn next_day(&mut self) {
        self.current_date += Duration::days(1);
        self.sequencer.start_new_day();
    }

    fn resolve_window(&mut self, index: usize) -> AllocatorState {
        let Some(window) = self.day_windows.get(index).copied() else {
            self.next_day();
            return AllocatorState::AdvancingDay;
        };

        let mut end = window.end_minute();
        if self.current_date == self.deadline.date() {
            end = end.min(schedule_utils::minutes_from_midnight(self.deadline.time()));
        }

        self.clock = window.start_minute();
        self.window_end = end;
        if self.clock >= self.window_end {
            return AllocatorState::ResolvingWindow { index: index + 1 };
        }
        AllocatorState::PlacingBlock { index }
    }

    fn place_block(&mut self, index: usize) -> AllocatorState {
        if self.all_placed() {
            return AllocatorState::Finished;
        }
        if self.clock >= self.window_end {
            return AllocatorState::ResolvingWindow { index: index + 1 };
        }
        if self.remaining_minutes == 0 {
            self.complete_concept();
            return AllocatorState::PlacingBlock { index };
        }

        match self.sequencer.next_placement(self.remaining_minutes) {
            Placement::LongBreak(minutes) => {
                if !self.fits(minutes) {
                    return AllocatorState::ResolvingWindow { index: index + 1 };
                }
                self.emit_break(BreakLength::Long, minutes);
                self.sequencer.record_long_break();
            }
            Placement::StudyBlock(minutes) => {
                if !self.fits(minutes) {
                    return AllocatorState::ResolvingWindow { index: index + 1 };
                }
                self.emit_study(minutes);
                self.sequencer.record_study_block();
                self.remaining_minutes -= minutes;
                if self.remaining_minutes == 0 {
                    self.complete_concept();
                }

                if let Some(break_minutes) = self.sequencer.short_break_after_study(!self.all_placed()) {
                    if self.fits(break_minutes) {
                        self.emit_break(BreakLength::Short, break_minutes);
                    }
                }
            }
        }

        AllocatorState::PlacingBlock { index }
    }

    fn fits(&self, minutes: u32) -> bool {
        schedule_utils::add_minutes(self.clock, minutes).is_some_and(|end| end <= self.window_end)
    }

    fn complete_concept(&mut self) {
        self.concept_index += 1;
        self.part = 0;
        self.remaining_minutes = self
            .concepts
            .get(self.concept_index)
            .map(|c| c.estimated_minutes)
            .unwrap_or(0);
    }

    fn emit_study(&mut self, minutes: u32) {
        let concept = &self.concepts[self.concept_index];
        self.part += 1;
        let block = ScheduleBlock {
            date: self.current_date,
            start_time: schedule_utils::to_naive_time(self.clock),
            end_time: schedule_utils::to_naive_time(self.clock + minutes),
            title: format!("Study: {}", concept.title),
            kind: BlockKind::Study {
                concept_id: concept.id.clone(),
                difficulty: concept.difficulty,
                part: self.part,
                key_points: concept.key_points.clone(),
            },
        };
        self.blocks.push(block);
        self.clock += minutes;
    }

    fn emit_break(&mut self, length: BreakLength, minutes: u32) {
        self.blocks.push(ScheduleBlock {
            date: self.current_date,
            start_time: schedule_utils::to_naive_time(self.clock),
            end_time: schedule_utils::to_naive_time(self.clock + minutes),
            title: length.title().to_string(),
            kind: BlockKind::Break { length },
        });
        self.clock += minutes;
    }

    fn into_outcome(mut self) -> AllocationOutcome {
        let placed = self.concept_index.min(self.concepts.len());
        let partially_placed = (self.part > 0)
            .then(|| self.concepts.get(placed).map(|c| c.id.clone()))
            .flatten();
        self.blocks
            .sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.start_time.cmp(&b.start_time)));

        AllocationOutcome {
            blocks: self.blocks,
            scheduled: self.concepts[..placed].to_vec(),
            unplaced: self.concepts[placed..].to_vec(),
            partially_placed,
            days_walked: self.days_walked,
        }
    }
}
