//! SeaORM Entity for the processing_tasks table.
//! The operational ledger for one upload's background work. Never deleted
//! automatically; retained as an audit trail.

use crate::task_status::TaskStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::processing_tasks::Model)]
#[sea_orm(schema_name = "meeting_notes", table_name = "processing_tasks")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Id,

    pub workspace_id: Id,

    /// Original filename of the uploaded audio
    pub filename: String,

    /// Upload size in bytes
    pub file_size: i64,

    pub status: TaskStatus,

    /// Coarse completion percentage, 0-100, monotonically non-decreasing
    /// within a stage
    pub progress: i32,

    /// Append-only list of timestamped log lines, stored as a JSON array
    #[schema(value_type = Option<Object>)]
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub logs: Option<Json>,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub start_time: Option<DateTimeWithTimeZone>,

    /// Filled in during processing; SET NULL if the meeting is deleted
    pub meeting_id: Option<Id>,

    /// External queue job reference; informational only, the task row is
    /// the source of truth for resumability
    pub queue_job_id: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::workspaces::Entity",
        from = "Column::WorkspaceId",
        to = "super::workspaces::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Workspaces,

    #[sea_orm(
        belongs_to = "super::meetings::Entity",
        from = "Column::MeetingId",
        to = "super::meetings::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Meetings,
}

impl Related<super::workspaces::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspaces.def()
    }
}

impl Related<super::meetings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meetings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
