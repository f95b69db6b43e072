//! Domain operations on processing tasks, including the finalization gate
//! that closes out a reviewed task.

use crate::error::Error;
use entity::meeting_status::MeetingStatus;
use entity::meetings::Model as MeetingModel;
use entity::task_status::TaskStatus;
use entity::Id;
use entity_api::{meeting, processing_task, workspace};
use log::*;
use sea_orm::DatabaseConnection;

pub use entity_api::processing_task::find_by_id;

/// Lists a workspace's tasks, newest first, rejecting unknown workspaces.
pub async fn list_by_workspace(
    db: &DatabaseConnection,
    workspace_id: Id,
) -> Result<Vec<entity::processing_tasks::Model>, Error> {
    workspace::find_by_id(db, workspace_id).await?;
    Ok(processing_task::find_by_workspace(db, workspace_id).await?)
}

/// User-supplied fields applied to the meeting at finalize time.
#[derive(Debug, Clone)]
pub struct FinalizeRequest {
    pub title: String,
    pub template: Option<String>,
    pub tags: Vec<String>,
}

/// Decides whether a task may be finalized, purely from its status and
/// progress. Accepted: REVIEW_READY; COMPLETED at 100% (idempotent
/// re-finalize); PROCESSING at 100% (transcription fully done while
/// summarization still runs). Everything else is rejected with a message
/// reporting the observed state so the caller can decide to wait or retry.
///
/// Note this reads a snapshot: a worker racing this check can fail the task
/// right after it passes. The race is narrow and accepted; there is no row
/// locking here.
pub(crate) fn finalize_disposition(status: &TaskStatus, progress: i32) -> Result<(), String> {
    match (status, progress) {
        (TaskStatus::ReviewReady, _) => Ok(()),
        (TaskStatus::Completed, 100) => Ok(()),
        (TaskStatus::Processing, 100) => Ok(()),
        _ => Err(format!(
            "Task must be in 'review_ready' status (or 'completed'/'processing' with 100% \
             progress) to finalize. Current status: {status}, progress: {progress}%"
        )),
    }
}

/// Finalizes a task: locates or creates its meeting, overwrites the
/// user-facing fields, and marks the task completed. Safe to call more than
/// once; the second call lands in the completed branch and only overwrites.
pub async fn finalize(
    db: &DatabaseConnection,
    task_id: Id,
    request: FinalizeRequest,
) -> Result<MeetingModel, Error> {
    let task = processing_task::find_by_id(db, task_id).await?;

    finalize_disposition(&task.status, task.progress).map_err(Error::invalid)?;

    let existing = match task.meeting_id {
        Some(meeting_id) => meeting::find_by_id(db, meeting_id).await.ok(),
        None => None,
    };

    let meeting = match existing {
        Some(existing) => {
            let mut model = existing.clone();
            model.title = request.title;
            model.template = request.template;
            model.tags = Some(serde_json::json!(request.tags));
            let updated = meeting::update(db, existing.id, model).await?;

            // A meeting still summarizing stays that way; the running stage
            // will complete it. Everything else not already completed gets
            // closed out now.
            if !matches!(
                updated.status,
                MeetingStatus::Summarizing | MeetingStatus::Completed
            ) {
                meeting::update_status(db, updated.id, MeetingStatus::Completed, None).await?
            } else {
                updated
            }
        }
        None => {
            // Rare path: the upload's meeting row never materialized (or was
            // deleted). Create it directly in its final state.
            info!("Creating meeting at finalize time for task {task_id}");
            let created = meeting::create(
                db,
                MeetingModel {
                    id: Id::default(),
                    title: request.title,
                    description: None,
                    status: MeetingStatus::Completed,
                    status_reason: None,
                    language_code: "yue".to_string(),
                    recorded_at: task
                        .start_time
                        .or_else(|| Some(chrono::Utc::now().into())),
                    audio_path: None,
                    audio_duration_seconds: None,
                    tags: Some(serde_json::json!(request.tags)),
                    template: request.template,
                    hubspot_synced: false,
                    workspace_id: Some(task.workspace_id),
                    owner_id: None,
                    created_at: chrono::Utc::now().into(),
                    updated_at: chrono::Utc::now().into(),
                },
            )
            .await?;
            processing_task::set_meeting(db, task.id, created.id).await?;
            created
        }
    };

    processing_task::update_status(db, task.id, TaskStatus::Completed, None).await?;

    info!("Finalized task {task_id} into meeting {}", meeting.id);
    Ok(meeting)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_ready_finalizes_at_any_progress() {
        assert!(finalize_disposition(&TaskStatus::ReviewReady, 100).is_ok());
        assert!(finalize_disposition(&TaskStatus::ReviewReady, 40).is_ok());
    }

    #[test]
    fn completed_and_processing_require_full_progress() {
        assert!(finalize_disposition(&TaskStatus::Completed, 100).is_ok());
        assert!(finalize_disposition(&TaskStatus::Processing, 100).is_ok());
        assert!(finalize_disposition(&TaskStatus::Completed, 99).is_err());
        assert!(finalize_disposition(&TaskStatus::Processing, 99).is_err());
    }

    #[test]
    fn queued_and_failed_tasks_are_rejected_with_observed_state() {
        let rejection = finalize_disposition(&TaskStatus::Queued, 0).unwrap_err();
        assert!(rejection.contains("queued"));
        assert!(rejection.contains("0%"));

        let rejection = finalize_disposition(&TaskStatus::Failed, 100).unwrap_err();
        assert!(rejection.contains("failed"));
    }

    #[test]
    fn in_flight_processing_below_full_progress_is_rejected() {
        let rejection = finalize_disposition(&TaskStatus::Processing, 60).unwrap_err();
        assert!(rejection.contains("processing"));
        assert!(rejection.contains("60%"));
    }
}
