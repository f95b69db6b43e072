//! SeaORM Entity for the meetings table.
//! A meeting is an uploaded audio artifact plus everything derived from it.

use crate::meeting_status::MeetingStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::meetings::Model)]
#[sea_orm(schema_name = "meeting_notes", table_name = "meetings")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Id,

    pub title: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Current pipeline state; transitions are checked against the
    /// MeetingStatus transition table.
    pub status: MeetingStatus,

    /// Human-readable cause, set when status becomes Failed
    #[sea_orm(column_type = "Text", nullable)]
    pub status_reason: Option<String>,

    /// ISO language code of the audio (default: yue)
    pub language_code: String,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub recorded_at: Option<DateTimeWithTimeZone>,

    /// Storage path of the uploaded audio blob
    pub audio_path: Option<String>,

    pub audio_duration_seconds: Option<i32>,

    /// Ordered tag strings, stored as a JSON array
    #[schema(value_type = Option<Object>)]
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub tags: Option<Json>,

    /// Free-text summary template category (e.g. "Sales")
    pub template: Option<String>,

    pub hubspot_synced: bool,

    /// Nullable for legacy rows only; required for listing/access control
    pub workspace_id: Option<Id>,

    pub owner_id: Option<Id>,

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

    #[sea_orm(has_one = "super::transcripts::Entity")]
    Transcripts,

    #[sea_orm(has_one = "super::summaries::Entity")]
    Summaries,

    #[sea_orm(has_many = "super::action_items::Entity")]
    ActionItems,

    #[sea_orm(has_many = "super::processing_tasks::Entity")]
    ProcessingTasks,
}

impl Related<super::workspaces::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspaces.def()
    }
}

impl Related<super::transcripts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transcripts.def()
    }
}

impl Related<super::summaries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Summaries.def()
    }
}

impl Related<super::action_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ActionItems.def()
    }
}

impl Related<super::processing_tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProcessingTasks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
