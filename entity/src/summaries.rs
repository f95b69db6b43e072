//! SeaORM Entity for the summaries table.
//! Structured LLM output, one per meeting.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::summaries::Model)]
#[sea_orm(schema_name = "meeting_notes", table_name = "summaries")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Id,

    #[sea_orm(unique)]
    pub meeting_id: Id,

    /// Short executive summary
    #[sea_orm(column_type = "Text", nullable)]
    pub overview: Option<String>,

    /// Structured meeting minutes in Markdown; absent for very short or
    /// non-business transcripts
    #[sea_orm(column_type = "Text", nullable)]
    pub detailed_minutes: Option<String>,

    #[schema(value_type = Option<Object>)]
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub agenda_items: Option<Json>,

    #[schema(value_type = Option<Object>)]
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub decisions: Option<Json>,

    #[schema(value_type = Option<Object>)]
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub highlights: Option<Json>,

    /// Model identifier that produced this summary
    pub generated_by_model: Option<String>,

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
