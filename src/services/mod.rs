pub mod block_allocator;
pub mod concept_ranker;
pub mod feasibility_service;
pub mod ordering;
pub mod review_planner;
pub mod schedule_service;
pub mod schedule_utils;
pub mod session_summary;
pub mod settings_service;
