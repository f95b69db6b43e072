//! The background processing pipeline: an explicit, ordered stage table
//! driving a Meeting from upload through transcription and summarization.
//!
//! Chaining is declared once in `Stage::successor`, not buried in stage
//! handlers: when a stage succeeds and has a successor, the successor is
//! enqueued with the same job arguments. Any stage error marks both the
//! Meeting and its ProcessingTask as failed before propagating; the worker
//! then drops the job. Nothing is retried automatically.

pub mod summarization;
pub mod transcription;

use crate::error::{DomainErrorKind, Error};
use crate::queue::{self, EnqueueOptions, JobArgs};
use entity::job_stage::JobStage;
use entity::meeting_status::MeetingStatus;
use entity::processing_tasks::Model as ProcessingTaskModel;
use entity::queue_lane::QueueLane;
use entity::task_status::TaskStatus;
use entity::Id;
use entity_api::{meeting, processing_task};
use log::*;
use sea_orm::DatabaseConnection;
use service::config::Config;
use std::time::Duration;

/// One step of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Transcription,
    Summarization,
}

impl Stage {
    pub fn from_job_stage(job_stage: JobStage) -> Self {
        match job_stage {
            JobStage::Transcription => Stage::Transcription,
            JobStage::Summarization => Stage::Summarization,
        }
    }

    pub fn job_stage(&self) -> JobStage {
        match self {
            Stage::Transcription => JobStage::Transcription,
            Stage::Summarization => JobStage::Summarization,
        }
    }

    /// The stage automatically enqueued after this one succeeds. This is
    /// the single place the transcription -> summarization chain is
    /// declared.
    pub fn successor(&self) -> Option<Stage> {
        match self {
            Stage::Transcription => Some(Stage::Summarization),
            Stage::Summarization => None,
        }
    }

    /// Queue knobs per stage: long audio needs a generous transcription
    /// budget; finished and failed jobs are kept for a day of inspection.
    pub fn enqueue_options(&self) -> EnqueueOptions {
        let timeout = match self {
            Stage::Transcription => Duration::from_secs(2 * 60 * 60),
            Stage::Summarization => Duration::from_secs(30 * 60),
        };
        EnqueueOptions {
            timeout,
            result_keep: Duration::from_secs(24 * 60 * 60),
            failure_keep: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Transcription => write!(fmt, "transcription"),
            Stage::Summarization => write!(fmt, "summarization"),
        }
    }
}

/// Everything a stage needs to run. Vendor clients are constructed inside
/// the stage from config, per run, never held as process-wide state.
pub struct StageContext<'a> {
    pub db: &'a DatabaseConnection,
    pub config: &'a Config,
    pub meeting_id: Id,
    pub task_id: Option<Id>,
}

/// Runs one pipeline stage. On error, marks the Meeting FAILED (with a
/// status reason) and the ProcessingTask FAILED (with an error message)
/// before propagating the error to the worker.
pub async fn run_stage(stage: Stage, ctx: &StageContext<'_>) -> Result<(), Error> {
    info!(
        "Running {stage} stage for meeting {} (task: {:?})",
        ctx.meeting_id, ctx.task_id
    );

    let result = match stage {
        Stage::Transcription => transcription::run(ctx).await,
        Stage::Summarization => summarization::run(ctx).await,
    };

    match result {
        Ok(()) => Ok(()),
        Err(err) => {
            mark_failure(ctx, stage, &err).await;
            Err(err)
        }
    }
}

/// Enqueues the successor stage after a successful run. An enqueue failure
/// here is logged against the task but does not revert the finished stage's
/// success; recovery is an operator re-enqueue.
pub(crate) async fn chain_successor(stage: Stage, ctx: &StageContext<'_>) {
    let Some(next) = stage.successor() else {
        return;
    };

    let args = JobArgs {
        meeting_id: ctx.meeting_id,
        task_id: ctx.task_id,
    };

    match queue::enqueue(
        ctx.db,
        QueueLane::Default,
        next.job_stage(),
        &args,
        next.enqueue_options(),
    )
    .await
    {
        Ok(handle) => {
            info!("Enqueued {next} stage for meeting {}", ctx.meeting_id);
            log_task(ctx, &format!("Enqueued {next} task (job: {})", handle.id)).await;
        }
        Err(err) => {
            error!(
                "Failed to enqueue {next} stage for meeting {}: {err}",
                ctx.meeting_id
            );
            log_task(ctx, &format!("Failed to enqueue {next} task: {err}")).await;
        }
    }
}

/// Human-readable failure reason: vendor/external failures get the stage
/// prefix, everything else is reported as unexpected.
pub(crate) fn failure_reason(stage: Stage, err: &Error) -> String {
    match (&err.error_kind, stage) {
        (DomainErrorKind::External(_), Stage::Transcription) => {
            format!("Transcription failed: {err}")
        }
        (DomainErrorKind::External(_), Stage::Summarization) => {
            format!("Summarization failed: {err}")
        }
        (DomainErrorKind::Internal(_), _) => format!("Unexpected error: {err}"),
    }
}

/// Marks a stage's records failed after the worker killed it for exceeding
/// its job timeout. The stage itself never got the chance to do this.
pub async fn mark_stage_timed_out(stage: Stage, ctx: &StageContext<'_>, budget: Duration) {
    let err = Error {
        source: None,
        error_kind: DomainErrorKind::External(crate::error::ExternalErrorKind::Timeout(format!(
            "{stage} stage exceeded its {}s budget",
            budget.as_secs()
        ))),
    };
    mark_failure(ctx, stage, &err).await;
}

async fn mark_failure(ctx: &StageContext<'_>, stage: Stage, err: &Error) {
    let reason = failure_reason(stage, err);
    error!(
        "{stage} stage failed for meeting {}: {reason}",
        ctx.meeting_id
    );

    if let Err(update_err) =
        meeting::update_status(ctx.db, ctx.meeting_id, MeetingStatus::Failed, Some(reason.clone()))
            .await
    {
        warn!(
            "Failed to mark meeting {} as failed: {update_err}",
            ctx.meeting_id
        );
    }

    // The job may have arrived without a task id; fall back to the task
    // paired with the meeting so the ledger still records the failure.
    let task_id = match ctx.task_id {
        Some(task_id) => Some(task_id),
        None => resolve_task(ctx).await.map(|task| task.id),
    };

    if let Some(task_id) = task_id {
        if let Err(update_err) =
            processing_task::update_status(ctx.db, task_id, TaskStatus::Failed, Some(reason.clone()))
                .await
        {
            warn!("Failed to mark task {task_id} as failed: {update_err}");
        }
        if let Err(log_err) =
            processing_task::append_log(ctx.db, task_id, &format!("Error: {err}")).await
        {
            warn!("Failed to append failure log to task {task_id}: {log_err}");
        }
    }
}

/// Resolves the processing task for a stage run: by explicit task id first,
/// else the latest task paired with the meeting.
pub(crate) async fn resolve_task(ctx: &StageContext<'_>) -> Option<ProcessingTaskModel> {
    if let Some(task_id) = ctx.task_id {
        match processing_task::find_by_id(ctx.db, task_id).await {
            Ok(task) => return Some(task),
            Err(err) => warn!("Task {task_id} not found: {err}"),
        }
    }

    match processing_task::find_latest_by_meeting_id(ctx.db, ctx.meeting_id).await {
        Ok(task) => task,
        Err(err) => {
            warn!(
                "No processing task found for meeting {}: {err}",
                ctx.meeting_id
            );
            None
        }
    }
}

/// Best-effort task log append; stages continue even when bookkeeping
/// writes fail.
pub(crate) async fn log_task(ctx: &StageContext<'_>, message: &str) {
    if let Some(task_id) = ctx.task_id {
        if let Err(err) = processing_task::append_log(ctx.db, task_id, message).await {
            warn!("Failed to append log to task {task_id}: {err}");
        }
    }
}

/// Best-effort progress milestone update.
pub(crate) async fn set_task_progress(ctx: &StageContext<'_>, progress: i32) {
    if let Some(task_id) = ctx.task_id {
        if let Err(err) = processing_task::set_progress(ctx.db, task_id, progress).await {
            warn!("Failed to set progress on task {task_id}: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_stage_table_chains_transcription_into_summarization() {
        assert_eq!(Stage::Transcription.successor(), Some(Stage::Summarization));
        assert_eq!(Stage::Summarization.successor(), None);
    }

    #[test]
    fn stage_round_trips_through_its_queue_representation() {
        for stage in [Stage::Transcription, Stage::Summarization] {
            assert_eq!(Stage::from_job_stage(stage.job_stage()), stage);
        }
    }

    #[test]
    fn transcription_gets_the_long_timeout() {
        assert_eq!(
            Stage::Transcription.enqueue_options().timeout,
            Duration::from_secs(7200)
        );
        assert_eq!(
            Stage::Summarization.enqueue_options().timeout,
            Duration::from_secs(1800)
        );
    }

    #[test]
    fn vendor_failures_are_prefixed_with_the_stage_name() {
        let vendor_err = Error {
            source: None,
            error_kind: DomainErrorKind::External(crate::error::ExternalErrorKind::Vendor(
                "job j1 failed: bad audio".to_string(),
            )),
        };
        let reason = failure_reason(Stage::Transcription, &vendor_err);
        assert!(reason.starts_with("Transcription failed:"));
        assert!(reason.contains("bad audio"));

        let reason = failure_reason(Stage::Summarization, &vendor_err);
        assert!(reason.starts_with("Summarization failed:"));
    }

    #[test]
    fn internal_failures_are_reported_as_unexpected() {
        let internal = Error::internal("poisoned mutex");
        let reason = failure_reason(Stage::Transcription, &internal);
        assert!(reason.starts_with("Unexpected error:"));
    }
}
