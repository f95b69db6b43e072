//! CRUD operations for the processing_tasks table.
//!
//! All status writes go through the TaskStatus transition table, progress is
//! clamped to be monotonically non-decreasing within a stage, and the log
//! list is strictly append-only.

use super::error::{EntityApiErrorKind, Error};
use entity::processing_tasks::{ActiveModel, Column, Entity, Model};
use entity::task_status::TaskStatus;
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, Order, QueryOrder, TryIntoModel,
};

/// Clamps a proposed progress value: within a stage, progress never moves
/// backwards and never escapes 0-100.
pub(crate) fn next_progress(current: i32, proposed: i32) -> i32 {
    proposed.clamp(0, 100).max(current)
}

/// Prefixes a log message with a UTC wall-clock timestamp, matching the
/// format the review UI expects.
pub(crate) fn stamped(message: &str) -> String {
    format!("[{}] {}", chrono::Utc::now().format("%I:%M:%S %p"), message)
}

fn logs_vec(logs: &Option<Json>) -> Vec<String> {
    match logs {
        Some(Json::Array(entries)) => entries
            .iter()
            .filter_map(|entry| entry.as_str().map(String::from))
            .collect(),
        _ => Vec::new(),
    }
}

/// Creates a new processing task alongside its meeting at upload time.
pub async fn create(db: &DatabaseConnection, model: Model) -> Result<Model, Error> {
    debug!("Creating new processing task for file: {}", model.filename);

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        workspace_id: Set(model.workspace_id),
        filename: Set(model.filename),
        file_size: Set(model.file_size),
        status: Set(model.status),
        progress: Set(model.progress),
        logs: Set(model.logs),
        start_time: Set(model.start_time),
        meeting_id: Set(model.meeting_id),
        queue_job_id: Set(model.queue_job_id),
        error_message: Set(model.error_message),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Ok(active_model.insert(db).await?.try_into_model()?)
}

/// Finds a processing task by ID
pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

/// Lists a workspace's tasks, newest first.
pub async fn find_by_workspace(db: &DatabaseConnection, workspace_id: Id) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::WorkspaceId.eq(workspace_id))
        .order_by(Column::CreatedAt, Order::Desc)
        .all(db)
        .await?)
}

/// Finds the most recent task paired with a meeting.
pub async fn find_latest_by_meeting_id(
    db: &DatabaseConnection,
    meeting_id: Id,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::MeetingId.eq(meeting_id))
        .order_by(Column::CreatedAt, Order::Desc)
        .one(db)
        .await?)
}

fn base_active_model(existing: &Model) -> ActiveModel {
    ActiveModel {
        id: Unchanged(existing.id),
        workspace_id: Unchanged(existing.workspace_id),
        filename: Unchanged(existing.filename.clone()),
        file_size: Unchanged(existing.file_size),
        status: Unchanged(existing.status.clone()),
        progress: Unchanged(existing.progress),
        logs: Unchanged(existing.logs.clone()),
        start_time: Unchanged(existing.start_time),
        meeting_id: Unchanged(existing.meeting_id),
        queue_job_id: Unchanged(existing.queue_job_id.clone()),
        error_message: Unchanged(existing.error_message.clone()),
        created_at: Unchanged(existing.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    }
}

/// Updates a task's status, enforcing the transition table. An invalid
/// transition is rejected without mutating the row.
pub async fn update_status(
    db: &DatabaseConnection,
    id: Id,
    status: TaskStatus,
    error_message: Option<String>,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    if !existing.status.can_transition_to(&status) {
        warn!(
            "Rejected task status transition {} -> {} for {id}",
            existing.status, status
        );
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::ValidationError,
        });
    }

    debug!(
        "Updating task status {} -> {} for {id}",
        existing.status, status
    );

    let mut active_model = base_active_model(&existing);
    active_model.status = Set(status);
    if error_message.is_some() {
        active_model.error_message = Set(error_message);
    }

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Moves a task into Processing at the start of a pipeline stage, resetting
/// progress to the given low value. A stage start is the only place a task's
/// progress may move backwards.
pub async fn begin_stage(
    db: &DatabaseConnection,
    id: Id,
    initial_progress: i32,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    if !existing.status.can_transition_to(&TaskStatus::Processing) {
        warn!(
            "Rejected stage start from status {} for {id}",
            existing.status
        );
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::ValidationError,
        });
    }

    let mut active_model = base_active_model(&existing);
    active_model.status = Set(TaskStatus::Processing);
    active_model.progress = Set(initial_progress.clamp(0, 100));

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Advances a task's progress milestone. Backward values are clamped away;
/// a Failed task accepts no further progress writes.
pub async fn set_progress(db: &DatabaseConnection, id: Id, progress: i32) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    if existing.status == TaskStatus::Failed {
        warn!("Ignoring progress update for failed task {id}");
        return Ok(existing);
    }

    let clamped = next_progress(existing.progress, progress);
    let mut active_model = base_active_model(&existing);
    active_model.progress = Set(clamped);

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Appends a timestamped line to the task's log. Logs are never truncated
/// or reordered.
pub async fn append_log(db: &DatabaseConnection, id: Id, message: &str) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    let mut entries = logs_vec(&existing.logs);
    entries.push(stamped(message));

    let mut active_model = base_active_model(&existing);
    active_model.logs = Set(Some(serde_json::json!(entries)));

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Records the external queue reference and start time after a successful
/// enqueue.
pub async fn set_queue_job(
    db: &DatabaseConnection,
    id: Id,
    queue_job_id: String,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    let mut active_model = base_active_model(&existing);
    active_model.queue_job_id = Set(Some(queue_job_id));
    active_model.start_time = Set(Some(chrono::Utc::now().into()));

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Links a task to the meeting it produced.
pub async fn set_meeting(db: &DatabaseConnection, id: Id, meeting_id: Id) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    let mut active_model = base_active_model(&existing);
    active_model.meeting_id = Set(Some(meeting_id));

    Ok(active_model.update(db).await?.try_into_model()?)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn task_model(status: TaskStatus, progress: i32) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            workspace_id: Id::new_v4(),
            filename: "meeting1.wav".to_string(),
            file_size: 3_500_000,
            status,
            progress,
            logs: None,
            start_time: None,
            meeting_id: None,
            queue_job_id: None,
            error_message: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn create_returns_a_new_processing_task_model() -> Result<(), Error> {
        let task_model = task_model(TaskStatus::Queued, 0);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![task_model.clone()]])
            .into_connection();

        let task = create(&db, task_model.clone()).await?;

        assert_eq!(task.id, task_model.id);
        assert_eq!(task.status, TaskStatus::Queued);

        Ok(())
    }

    #[tokio::test]
    async fn update_status_rejects_an_invalid_transition() {
        let failed = task_model(TaskStatus::Failed, 40);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![failed.clone()]])
            .into_connection();

        let result = update_status(&db, failed.id, TaskStatus::ReviewReady, None).await;

        match result {
            Err(err) => assert_eq!(err.error_kind, EntityApiErrorKind::ValidationError),
            Ok(_) => panic!("a failed task must not reopen into review_ready"),
        }
    }

    #[tokio::test]
    async fn set_progress_clamps_backward_writes() -> Result<(), Error> {
        let in_flight = task_model(TaskStatus::Processing, 90);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![in_flight.clone()], vec![in_flight.clone()]])
            .into_connection();

        let task = set_progress(&db, in_flight.id, 15).await?;

        assert_eq!(task.progress, 90);

        Ok(())
    }

    #[tokio::test]
    async fn failed_tasks_accept_no_further_progress_updates() -> Result<(), Error> {
        let failed = task_model(TaskStatus::Failed, 40);

        // Only the lookup is answered; a progress write would error the mock.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![failed.clone()]])
            .into_connection();

        let task = set_progress(&db, failed.id, 90).await?;

        assert_eq!(task.progress, 40);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_never_decreases() {
        assert_eq!(next_progress(90, 15), 90);
        assert_eq!(next_progress(15, 90), 90);
        assert_eq!(next_progress(100, 0), 100);
    }

    #[test]
    fn progress_is_clamped_to_percentage_range() {
        assert_eq!(next_progress(0, 150), 100);
        assert_eq!(next_progress(50, -10), 50);
        assert_eq!(next_progress(0, -10), 0);
    }

    #[test]
    fn stamped_lines_carry_a_timestamp_prefix() {
        let line = stamped("Starting transcription...");
        assert!(line.starts_with('['));
        assert!(line.ends_with("Starting transcription..."));
    }

    #[test]
    fn logs_vec_handles_missing_and_malformed_columns() {
        assert!(logs_vec(&None).is_empty());
        assert!(logs_vec(&Some(serde_json::json!("not-an-array"))).is_empty());
        let logs = logs_vec(&Some(serde_json::json!(["a", "b"])));
        assert_eq!(logs, vec!["a".to_string(), "b".to_string()]);
    }
}
