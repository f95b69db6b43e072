use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Named queue lanes. Workers drain lanes in priority order; the pipeline
/// currently enqueues everything on the default lane, the high-priority
/// lane exists for operator re-enqueues and future urgent work.
#[derive(Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Serialize, DeriveActiveEnum)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "queue_lane")]
pub enum QueueLane {
    #[sea_orm(string_value = "default")]
    Default,
    #[sea_orm(string_value = "high_priority")]
    HighPriority,
}

impl std::fmt::Display for QueueLane {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueLane::Default => write!(fmt, "default"),
            QueueLane::HighPriority => write!(fmt, "high_priority"),
        }
    }
}
