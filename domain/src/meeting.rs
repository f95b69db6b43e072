//! Domain operations on meetings: upload orchestration, listing, updates,
//! and cascade deletion.

use crate::error::Error;
use crate::pipeline::Stage;
use crate::queue::{self, JobArgs};
use crate::storage::LocalStorage;
use entity::meeting_status::MeetingStatus;
use entity::meetings::Model as MeetingModel;
use entity::processing_tasks::Model as ProcessingTaskModel;
use entity::queue_lane::QueueLane;
use entity::task_status::TaskStatus;
use entity::Id;
use entity_api::{action_item, meeting, processing_task, summary, transcript, workspace};
use log::*;
use sea_orm::DatabaseConnection;
use service::config::Config;

pub use entity_api::meeting::{find_by_id, find_by_workspace, MeetingSortField};
pub use entity_api::summary::SummaryPatch;

/// File extensions accepted for upload.
pub const ALLOWED_AUDIO_EXTENSIONS: [&str; 6] = ["m4a", "wav", "mp3", "aac", "flac", "ogg"];

/// An audio upload about to enter the pipeline.
#[derive(Debug)]
pub struct UploadRequest {
    pub workspace_id: Id,
    pub owner_id: Option<Id>,
    pub filename: String,
    pub bytes: Vec<u8>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub template: Option<String>,
    pub tags: Option<Vec<String>>,
    pub language_code: Option<String>,
}

/// Result of a successful upload: the created records plus the queue
/// reference for the first stage.
#[derive(Debug)]
pub struct UploadOutcome {
    pub meeting: MeetingModel,
    pub task: ProcessingTaskModel,
    pub job_id: Id,
}

/// A meeting with its derived artifacts, for the detail projection.
#[derive(Debug)]
pub struct MeetingDetail {
    pub meeting: MeetingModel,
    pub transcript: Option<entity::transcripts::Model>,
    pub summary: Option<entity::summaries::Model>,
    pub action_items: Vec<entity::action_items::Model>,
}

/// Mutable meeting fields accepted from the update endpoint.
#[derive(Debug, Default)]
pub struct MeetingUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub template: Option<String>,
    pub summary: Option<SummaryPatch>,
}

/// Rejects files whose extension is not a supported audio container.
pub fn validate_audio_filename(filename: &str) -> Result<(), Error> {
    let extension = std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    if ALLOWED_AUDIO_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "Unsupported file type. Allowed: {}",
            ALLOWED_AUDIO_EXTENSIONS
                .map(|ext| format!(".{ext}"))
                .join(", ")
        )))
    }
}

/// Default meeting title: the filename stem with underscores opened up.
pub(crate) fn default_title(filename: &str) -> String {
    let stem = std::path::Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("Untitled Meeting");
    stem.replace('_', " ")
}

/// Accepts an upload: persists the meeting and its processing task, stores
/// the audio blob, and enqueues the transcription stage. An enqueue failure
/// marks the task failed and propagates.
pub async fn upload(
    db: &DatabaseConnection,
    config: &Config,
    request: UploadRequest,
) -> Result<UploadOutcome, Error> {
    validate_audio_filename(&request.filename)?;
    workspace::find_by_id(db, request.workspace_id).await?;

    let title = request
        .title
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| default_title(&request.filename));

    let meeting = meeting::create(
        db,
        MeetingModel {
            id: Id::default(),
            title,
            description: request.description,
            status: MeetingStatus::Uploaded,
            status_reason: None,
            language_code: request.language_code.unwrap_or_else(|| "yue".to_string()),
            recorded_at: None,
            audio_path: None,
            audio_duration_seconds: None,
            tags: request.tags.map(|tags| serde_json::json!(tags)),
            template: request.template,
            hubspot_synced: false,
            workspace_id: Some(request.workspace_id),
            owner_id: request.owner_id,
            created_at: chrono::Utc::now().into(),
            updated_at: chrono::Utc::now().into(),
        },
    )
    .await?;

    let storage = LocalStorage::new(config.storage_dir());
    let storage_path = storage.save(&request.bytes, &request.filename, meeting.id)?;
    let meeting = meeting::set_audio_path(db, meeting.id, storage_path).await?;

    let task = processing_task::create(
        db,
        ProcessingTaskModel {
            id: Id::default(),
            workspace_id: request.workspace_id,
            filename: request.filename.clone(),
            file_size: request.bytes.len() as i64,
            status: TaskStatus::Queued,
            progress: 0,
            logs: Some(serde_json::json!(["File uploaded successfully"])),
            start_time: None,
            meeting_id: Some(meeting.id),
            queue_job_id: None,
            error_message: None,
            created_at: chrono::Utc::now().into(),
            updated_at: chrono::Utc::now().into(),
        },
    )
    .await?;

    info!(
        "Enqueuing transcription for meeting {}, task {}",
        meeting.id, task.id
    );

    let args = JobArgs {
        meeting_id: meeting.id,
        task_id: Some(task.id),
    };
    let enqueued = queue::enqueue(
        db,
        QueueLane::Default,
        Stage::Transcription.job_stage(),
        &args,
        Stage::Transcription.enqueue_options(),
    )
    .await;

    let job = match enqueued {
        Ok(job) => job,
        Err(err) => {
            error!("Failed to enqueue transcription task: {err}");
            let _ = processing_task::update_status(
                db,
                task.id,
                TaskStatus::Failed,
                Some(format!("Failed to enqueue task: {err}")),
            )
            .await;
            let _ = processing_task::append_log(
                db,
                task.id,
                &format!("Error: Failed to enqueue transcription task: {err}"),
            )
            .await;
            return Err(err);
        }
    };

    let task = processing_task::set_queue_job(db, task.id, job.id.to_string()).await?;

    Ok(UploadOutcome {
        meeting,
        task,
        job_id: job.id,
    })
}

/// Parameters for a workspace meeting listing.
#[derive(Debug)]
pub struct ListParams {
    pub workspace_id: Id,
    pub status: Option<MeetingStatus>,
    pub sort_by: MeetingSortField,
    pub descending: bool,
    pub page: u64,
    pub page_size: u64,
}

pub async fn list(db: &DatabaseConnection, params: ListParams) -> Result<Vec<MeetingModel>, Error> {
    workspace::find_by_id(db, params.workspace_id).await?;

    Ok(find_by_workspace(
        db,
        params.workspace_id,
        params.status,
        params.sort_by,
        params.descending,
        params.page,
        params.page_size,
    )
    .await?)
}

/// Loads a meeting together with its transcript, summary and action items.
pub async fn find_detail(db: &DatabaseConnection, id: Id) -> Result<MeetingDetail, Error> {
    let meeting = meeting::find_by_id(db, id).await?;
    let transcript = transcript::find_by_meeting_id(db, id).await?;
    let summary = summary::find_by_meeting_id(db, id).await?;
    let action_items = action_item::find_by_meeting_id(db, id).await?;

    Ok(MeetingDetail {
        meeting,
        transcript,
        summary,
        action_items,
    })
}

/// Applies a partial update to a meeting and, when present, its summary.
pub async fn update(
    db: &DatabaseConnection,
    id: Id,
    update: MeetingUpdate,
) -> Result<MeetingDetail, Error> {
    let existing = meeting::find_by_id(db, id).await?;

    let mut model = existing.clone();
    if let Some(title) = update.title {
        model.title = title;
    }
    if let Some(description) = update.description {
        model.description = Some(description);
    }
    if let Some(tags) = update.tags {
        model.tags = Some(serde_json::json!(tags));
    }
    if let Some(template) = update.template {
        model.template = Some(template);
    }
    meeting::update(db, id, model).await?;

    if let Some(patch) = update.summary {
        summary::patch_by_meeting_id(db, id, patch).await?;
    }

    find_detail(db, id).await
}

/// Deletes a meeting and everything derived from it. The audio blob removal
/// is best-effort; a missing blob is logged, never fatal.
pub async fn delete(db: &DatabaseConnection, config: &Config, id: Id) -> Result<(), Error> {
    let meeting = meeting::find_by_id(db, id).await?;

    if let Some(audio_path) = &meeting.audio_path {
        let storage = LocalStorage::new(config.storage_dir());
        if !storage.delete(audio_path) {
            warn!("Failed to delete audio file {audio_path} for meeting {id}");
        }
    }

    meeting::delete_by_id(db, id).await?;
    info!("Deleted meeting {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_default_to_the_filename_stem_with_spaces() {
        assert_eq!(default_title("q3_planning_sync.wav"), "q3 planning sync");
        assert_eq!(default_title("Standup.m4a"), "Standup");
        assert_eq!(default_title(""), "Untitled Meeting");
    }

    #[test]
    fn audio_extension_validation_is_case_insensitive() {
        assert!(validate_audio_filename("meeting1.wav").is_ok());
        assert!(validate_audio_filename("call.M4A").is_ok());
        assert!(validate_audio_filename("notes.txt").is_err());
        assert!(validate_audio_filename("no-extension").is_err());
    }
}
