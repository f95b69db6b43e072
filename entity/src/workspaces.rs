//! SeaORM Entity for the workspaces table.
//! The multi-tenant boundary; every core entity is scoped to a workspace.
//! Membership management lives outside this service.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::workspaces::Model)]
#[sea_orm(schema_name = "meeting_notes", table_name = "workspaces")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Id,

    pub name: String,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::meetings::Entity")]
    Meetings,

    #[sea_orm(has_many = "super::processing_tasks::Entity")]
    ProcessingTasks,
}

impl Related<super::meetings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meetings.def()
    }
}

impl Related<super::processing_tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProcessingTasks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
