//! Business logic for the meeting notes platform.
//!
//! This crate sits between the data-access layer (`entity_api`) and the web
//! layer: vendor gateways, blob storage, the durable job queue, the pipeline
//! orchestrator, and the domain operations controllers call. Consumers of
//! `domain` should not need to depend on `entity_api` directly; the items
//! they need are re-exported here.

pub use entity_api::{
    action_items, meetings, processing_tasks, queue_jobs, summaries, transcripts, workspaces, Id,
};

// Status enums re-exported from the `entity` crate
pub use entity::{
    action_priority, action_status, job_stage, job_status, meeting_status, queue_lane, task_status,
};

pub mod error;
pub mod gateway;
pub mod meeting;
pub mod pipeline;
pub mod processing_task;
pub mod queue;
pub mod storage;
