use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle of a durable queue job.
///
/// Queued → Running is the claim edge; workers never move a job back to
/// Queued. Succeeded/Failed rows are retained until their retention window
/// lapses so operators can inspect and re-enqueue.
#[derive(Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Serialize, DeriveActiveEnum)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "job_status")]
pub enum JobStatus {
    #[sea_orm(string_value = "queued")]
    Queued,
    #[sea_orm(string_value = "running")]
    Running,
    #[sea_orm(string_value = "succeeded")]
    Succeeded,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Queued => write!(fmt, "queued"),
            JobStatus::Running => write!(fmt, "running"),
            JobStatus::Succeeded => write!(fmt, "succeeded"),
            JobStatus::Failed => write!(fmt, "failed"),
        }
    }
}
