//! CRUD operations for the queue_jobs table.
//!
//! The durable queue is FIFO per lane with at-least-once delivery. Claiming
//! is an optimistic conditional update (queued -> running), so concurrent
//! workers never double-claim a job.

use super::error::{EntityApiErrorKind, Error};
use entity::job_stage::JobStage;
use entity::job_status::JobStatus;
use entity::queue_jobs::{ActiveModel, Column, Entity, Model};
use entity::queue_lane::QueueLane;
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, DatabaseConnection, IntoActiveModel, Order, QueryOrder,
    TryIntoModel,
};

/// Inserts a new queued job.
pub async fn enqueue(
    db: &DatabaseConnection,
    lane: QueueLane,
    stage: JobStage,
    payload: Json,
    timeout_seconds: i64,
    result_keep_seconds: i64,
    failure_keep_seconds: i64,
) -> Result<Model, Error> {
    debug!("Enqueuing {stage} job on {lane} lane");

    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        lane: Set(lane),
        stage: Set(stage),
        payload: Set(payload),
        status: Set(JobStatus::Queued),
        error_message: Set(None),
        timeout_seconds: Set(timeout_seconds),
        result_keep_seconds: Set(result_keep_seconds),
        failure_keep_seconds: Set(failure_keep_seconds),
        enqueued_at: Set(chrono::Utc::now().into()),
        started_at: Set(None),
        finished_at: Set(None),
    };

    Ok(active_model.insert(db).await?.try_into_model()?)
}

/// Finds a queue job by ID
pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

/// Claims the oldest queued job, draining lanes in the order given. Returns
/// None when every lane is empty.
pub async fn claim_next(
    db: &DatabaseConnection,
    lanes: &[QueueLane],
) -> Result<Option<Model>, Error> {
    for lane in lanes {
        loop {
            let candidate = Entity::find()
                .filter(Column::Lane.eq(*lane))
                .filter(Column::Status.eq(JobStatus::Queued))
                .order_by(Column::EnqueuedAt, Order::Asc)
                .one(db)
                .await?;

            let Some(candidate) = candidate else {
                break;
            };

            let claim = ActiveModel {
                status: Set(JobStatus::Running),
                started_at: Set(Some(chrono::Utc::now().into())),
                ..Default::default()
            };

            let result = Entity::update_many()
                .set(claim)
                .filter(Column::Id.eq(candidate.id))
                .filter(Column::Status.eq(JobStatus::Queued))
                .exec(db)
                .await?;

            if result.rows_affected == 1 {
                debug!("Claimed {} job {} from {lane} lane", candidate.stage, candidate.id);
                return Ok(Some(find_by_id(db, candidate.id).await?));
            }
            // Another worker claimed it first; take the next oldest.
        }
    }

    Ok(None)
}

/// Marks a running job as succeeded.
pub async fn mark_succeeded(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    finish(db, id, JobStatus::Succeeded, None).await
}

/// Marks a running job as failed, recording the error text.
pub async fn mark_failed(
    db: &DatabaseConnection,
    id: Id,
    error_message: String,
) -> Result<Model, Error> {
    finish(db, id, JobStatus::Failed, Some(error_message)).await
}

async fn finish(
    db: &DatabaseConnection,
    id: Id,
    status: JobStatus,
    error_message: Option<String>,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    let mut active_model = existing.into_active_model();
    active_model.status = Set(status);
    active_model.error_message = Set(error_message);
    active_model.finished_at = Set(Some(chrono::Utc::now().into()));

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Deletes finished jobs whose retention window has lapsed. Returns the
/// number of rows removed.
pub async fn prune_expired(db: &DatabaseConnection) -> Result<u64, Error> {
    let now = chrono::Utc::now().fixed_offset();

    let finished = Entity::find()
        .filter(Column::Status.is_in([JobStatus::Succeeded, JobStatus::Failed]))
        .all(db)
        .await?;

    let expired: Vec<Id> = finished
        .into_iter()
        .filter(|job| {
            let Some(finished_at) = job.finished_at else {
                return false;
            };
            let keep_seconds = match job.status {
                JobStatus::Succeeded => job.result_keep_seconds,
                _ => job.failure_keep_seconds,
            };
            finished_at + chrono::Duration::seconds(keep_seconds) < now
        })
        .map(|job| job.id)
        .collect();

    if expired.is_empty() {
        return Ok(0);
    }

    let result = Entity::delete_many()
        .filter(Column::Id.is_in(expired))
        .exec(db)
        .await?;
    debug!("Pruned {} expired queue jobs", result.rows_affected);

    Ok(result.rows_affected)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn queued_job(lane: QueueLane) -> Model {
        Model {
            id: Id::new_v4(),
            lane,
            stage: JobStage::Transcription,
            payload: serde_json::json!({"meeting_id": Id::new_v4(), "task_id": null}),
            status: JobStatus::Queued,
            error_message: None,
            timeout_seconds: 7200,
            result_keep_seconds: 86400,
            failure_keep_seconds: 86400,
            enqueued_at: chrono::Utc::now().into(),
            started_at: None,
            finished_at: None,
        }
    }

    #[tokio::test]
    async fn claim_next_returns_none_when_every_lane_is_empty() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new(), Vec::<Model>::new()])
            .into_connection();

        let claimed =
            claim_next(&db, &[QueueLane::HighPriority, QueueLane::Default]).await?;

        assert!(claimed.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn claim_next_claims_the_oldest_queued_job() -> Result<(), Error> {
        let candidate = queued_job(QueueLane::Default);
        let mut running = candidate.clone();
        running.status = JobStatus::Running;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![candidate.clone()]])
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results(vec![vec![running.clone()]])
            .into_connection();

        let claimed = claim_next(&db, &[QueueLane::Default]).await?;

        let job = claimed.expect("the queued job should have been claimed");
        assert_eq!(job.id, candidate.id);
        assert_eq!(job.status, JobStatus::Running);

        Ok(())
    }
}
