//! SeaORM Entity for the queue_jobs table.
//! Backing store for the durable work queue. Rows persist after completion
//! until their retention window lapses.

use crate::job_stage::JobStage;
use crate::job_status::JobStatus;
use crate::queue_lane::QueueLane;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::queue_jobs::Model)]
#[sea_orm(schema_name = "meeting_notes", table_name = "queue_jobs")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Id,

    pub lane: QueueLane,

    pub stage: JobStage,

    /// Stage arguments (meeting id, task id) as JSON
    #[schema(value_type = Object)]
    #[sea_orm(column_type = "JsonBinary")]
    pub payload: Json,

    pub status: JobStatus,

    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,

    /// Wall-clock budget the worker applies to the stage
    pub timeout_seconds: i64,

    /// How long a succeeded row is retained
    pub result_keep_seconds: i64,

    /// How long a failed row is retained
    pub failure_keep_seconds: i64,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub enqueued_at: DateTimeWithTimeZone,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub started_at: Option<DateTimeWithTimeZone>,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub finished_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
