pub use entity::{
    action_items, meetings, processing_tasks, queue_jobs, summaries, transcripts, workspaces, Id,
};

pub mod action_item;
pub mod error;
pub mod meeting;
pub mod processing_task;
pub mod queue_job;
pub mod summary;
pub mod transcript;
pub mod workspace;

/// Parses a plain `YYYY-MM-DD` date string.
pub fn naive_date_parse_str(date_str: &str) -> Result<chrono::NaiveDate, error::Error> {
    chrono::NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| error::Error {
        source: None,
        error_kind: error::EntityApiErrorKind::InvalidQueryTerm,
    })
}
