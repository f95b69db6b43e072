//! Durable job queue facade over the queue_jobs table.
//!
//! FIFO per lane, at-least-once delivery. The API process enqueues, worker
//! processes claim and finish jobs. Job ids handed back here are
//! informational; processing_tasks rows remain the source of truth for
//! resumability.

use crate::error::Error;
use entity::job_stage::JobStage;
use entity::queue_lane::QueueLane;
use entity::Id;
use entity_api::queue_job;
use log::*;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lanes in the order a worker should drain them.
pub const WORKER_LANES: [QueueLane; 2] = [QueueLane::HighPriority, QueueLane::Default];

/// Arguments carried by every pipeline job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobArgs {
    pub meeting_id: Id,
    pub task_id: Option<Id>,
}

/// Reference to an enqueued job.
#[derive(Debug, Clone, Copy)]
pub struct JobHandle {
    pub id: Id,
}

/// Retention and timeout knobs for an enqueue.
#[derive(Debug, Clone, Copy)]
pub struct EnqueueOptions {
    pub timeout: Duration,
    pub result_keep: Duration,
    pub failure_keep: Duration,
}

/// A claimed job ready for execution by a worker.
#[derive(Debug, Clone)]
pub struct ClaimedJob {
    pub id: Id,
    pub stage: JobStage,
    pub args: JobArgs,
    pub timeout: Duration,
}

/// Enqueues a pipeline stage on the given lane.
pub async fn enqueue(
    db: &DatabaseConnection,
    lane: QueueLane,
    stage: JobStage,
    args: &JobArgs,
    options: EnqueueOptions,
) -> Result<JobHandle, Error> {
    let payload = serde_json::to_value(args)?;

    let job = queue_job::enqueue(
        db,
        lane,
        stage,
        payload,
        options.timeout.as_secs() as i64,
        options.result_keep.as_secs() as i64,
        options.failure_keep.as_secs() as i64,
    )
    .await?;

    info!("Enqueued {stage} job {} on {lane} lane", job.id);
    Ok(JobHandle { id: job.id })
}

/// Claims the next runnable job, draining lanes in the given order. Returns
/// None when all lanes are empty.
pub async fn claim_next(
    db: &DatabaseConnection,
    lanes: &[QueueLane],
) -> Result<Option<ClaimedJob>, Error> {
    let Some(job) = queue_job::claim_next(db, lanes).await? else {
        return Ok(None);
    };

    let args: JobArgs = serde_json::from_value(job.payload).map_err(|err| {
        warn!("Job {} carries an unreadable payload: {err}", job.id);
        Error::invalid(format!("Job {} carries an unreadable payload", job.id))
    })?;

    Ok(Some(ClaimedJob {
        id: job.id,
        stage: job.stage,
        args,
        timeout: Duration::from_secs(job.timeout_seconds.max(0) as u64),
    }))
}

/// Marks a claimed job as succeeded.
pub async fn complete(db: &DatabaseConnection, id: Id) -> Result<(), Error> {
    queue_job::mark_succeeded(db, id).await?;
    Ok(())
}

/// Marks a claimed job as failed. The job is not re-queued; recovery is an
/// explicit operator re-enqueue.
pub async fn fail(db: &DatabaseConnection, id: Id, error_message: String) -> Result<(), Error> {
    queue_job::mark_failed(db, id, error_message).await?;
    Ok(())
}

/// Removes finished jobs whose retention window has lapsed.
pub async fn prune_expired(db: &DatabaseConnection) -> Result<u64, Error> {
    Ok(queue_job::prune_expired(db).await?)
}
