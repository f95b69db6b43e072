//! SeaORM Entity for the transcripts table.
//! Normalized ASR output, one per meeting.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::transcripts::Model)]
#[sea_orm(schema_name = "meeting_notes", table_name = "transcripts")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Id,

    #[sea_orm(unique)]
    pub meeting_id: Id,

    pub language_code: String,

    pub duration_seconds: Option<i32>,

    /// Full transcript text; must be non-empty before summarization runs
    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Ordered segment records ({id, text, start_time, end_time, speaker,
    /// speaker_id}) as a JSON array
    #[schema(value_type = Option<Object>)]
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub segments: Option<Json>,

    /// Opaque vendor payload retained for audit/debugging; never parsed
    /// outside the normalizer
    #[schema(value_type = Option<Object>)]
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub raw_response: Option<Json>,

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
        belongs_to = "super::meetings::Entity",
        from = "Column::MeetingId",
        to = "super::meetings::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Meetings,
}

impl Related<super::meetings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meetings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
