use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Completion state of an action item.
#[derive(
    Debug, Clone, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "action_status")]
pub enum ActionStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "done")]
    Done,
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionStatus::Pending => write!(fmt, "pending"),
            ActionStatus::InProgress => write!(fmt, "in_progress"),
            ActionStatus::Done => write!(fmt, "done"),
        }
    }
}
