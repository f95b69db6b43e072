use uuid::Uuid;

pub mod prelude;

// Core entities
pub mod action_items;
pub mod meetings;
pub mod processing_tasks;
pub mod queue_jobs;
pub mod summaries;
pub mod transcripts;
pub mod workspaces;

// Status enums and their transition tables
pub mod action_priority;
pub mod action_status;
pub mod job_stage;
pub mod job_status;
pub mod meeting_status;
pub mod queue_lane;
pub mod task_status;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
