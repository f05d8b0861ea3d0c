pub mod availability;
pub mod concept;
pub mod feasibility;
pub mod schedule;
pub mod session;
pub mod settings;
pub mod timeline;
