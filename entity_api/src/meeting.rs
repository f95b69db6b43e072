//! CRUD operations for the meetings table.

use super::error::{EntityApiErrorKind, Error};
use entity::meeting_status::MeetingStatus;
use entity::meetings::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, Order, QueryOrder, QuerySelect, TryIntoModel,
};

/// Field a meeting listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeetingSortField {
    #[default]
    CreatedAt,
    RecordedAt,
    Title,
}

impl std::str::FromStr for MeetingSortField {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "created_at" => Ok(MeetingSortField::CreatedAt),
            "recorded_at" => Ok(MeetingSortField::RecordedAt),
            "title" => Ok(MeetingSortField::Title),
            _ => Err(Error {
                source: None,
                error_kind: EntityApiErrorKind::InvalidQueryTerm,
            }),
        }
    }
}

impl MeetingSortField {
    fn column(&self) -> Column {
        match self {
            MeetingSortField::CreatedAt => Column::CreatedAt,
            MeetingSortField::RecordedAt => Column::RecordedAt,
            MeetingSortField::Title => Column::Title,
        }
    }
}

/// Creates a new meeting record. The caller supplies everything except the
/// id and timestamps.
pub async fn create(db: &DatabaseConnection, model: Model) -> Result<Model, Error> {
    debug!("Creating new meeting: {}", model.title);

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        title: Set(model.title),
        description: Set(model.description),
        status: Set(model.status),
        status_reason: Set(model.status_reason),
        language_code: Set(model.language_code),
        recorded_at: Set(model.recorded_at),
        audio_path: Set(model.audio_path),
        audio_duration_seconds: Set(model.audio_duration_seconds),
        tags: Set(model.tags),
        template: Set(model.template),
        hubspot_synced: Set(model.hubspot_synced),
        workspace_id: Set(model.workspace_id),
        owner_id: Set(model.owner_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Ok(active_model.insert(db).await?.try_into_model()?)
}

/// Finds a meeting by ID
pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

/// Lists meetings in a workspace with optional status filter, sorting and
/// offset pagination. Pages are 1-based.
pub async fn find_by_workspace(
    db: &DatabaseConnection,
    workspace_id: Id,
    status: Option<MeetingStatus>,
    sort_by: MeetingSortField,
    descending: bool,
    page: u64,
    page_size: u64,
) -> Result<Vec<Model>, Error> {
    let mut query = Entity::find().filter(Column::WorkspaceId.eq(workspace_id));

    if let Some(status) = status {
        query = query.filter(Column::Status.eq(status));
    }

    let order = if descending { Order::Desc } else { Order::Asc };
    let page = page.max(1);

    Ok(query
        .order_by(sort_by.column(), order)
        .offset((page - 1) * page_size)
        .limit(page_size)
        .all(db)
        .await?)
}

/// Updates the mutable fields of an existing meeting.
pub async fn update(db: &DatabaseConnection, id: Id, model: Model) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;
    debug!("Updating meeting: {id}");

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        title: Set(model.title),
        description: Set(model.description),
        status: Unchanged(existing.status),
        status_reason: Unchanged(existing.status_reason),
        language_code: Set(model.language_code),
        recorded_at: Set(model.recorded_at),
        audio_path: Set(model.audio_path),
        audio_duration_seconds: Set(model.audio_duration_seconds),
        tags: Set(model.tags),
        template: Set(model.template),
        hubspot_synced: Set(model.hubspot_synced),
        workspace_id: Unchanged(existing.workspace_id),
        owner_id: Set(model.owner_id),
        created_at: Unchanged(existing.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Records the storage path of the uploaded audio blob.
pub async fn set_audio_path(db: &DatabaseConnection, id: Id, audio_path: String) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        title: Unchanged(existing.title),
        description: Unchanged(existing.description),
        status: Unchanged(existing.status),
        status_reason: Unchanged(existing.status_reason),
        language_code: Unchanged(existing.language_code),
        recorded_at: Unchanged(existing.recorded_at),
        audio_path: Set(Some(audio_path)),
        audio_duration_seconds: Unchanged(existing.audio_duration_seconds),
        tags: Unchanged(existing.tags),
        template: Unchanged(existing.template),
        hubspot_synced: Unchanged(existing.hubspot_synced),
        workspace_id: Unchanged(existing.workspace_id),
        owner_id: Unchanged(existing.owner_id),
        created_at: Unchanged(existing.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Updates a meeting's status, enforcing the transition table. An invalid
/// transition is rejected without mutating the row.
pub async fn update_status(
    db: &DatabaseConnection,
    id: Id,
    status: MeetingStatus,
    status_reason: Option<String>,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    if !existing.status.can_transition_to(&status) {
        warn!(
            "Rejected meeting status transition {} -> {} for {id}",
            existing.status, status
        );
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::ValidationError,
        });
    }

    debug!(
        "Updating meeting status {} -> {} for {id}",
        existing.status, status
    );

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        title: Unchanged(existing.title),
        description: Unchanged(existing.description),
        status: Set(status),
        status_reason: Set(status_reason),
        language_code: Unchanged(existing.language_code),
        recorded_at: Unchanged(existing.recorded_at),
        audio_path: Unchanged(existing.audio_path),
        audio_duration_seconds: Unchanged(existing.audio_duration_seconds),
        tags: Unchanged(existing.tags),
        template: Unchanged(existing.template),
        hubspot_synced: Unchanged(existing.hubspot_synced),
        workspace_id: Unchanged(existing.workspace_id),
        owner_id: Unchanged(existing.owner_id),
        created_at: Unchanged(existing.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Deletes a meeting by ID. Transcript, summary and action items go with it
/// via cascade.
pub async fn delete_by_id(db: &DatabaseConnection, id: Id) -> Result<(), Error> {
    let model = find_by_id(db, id).await?;
    Entity::delete_by_id(model.id).exec(db).await?;
    Ok(())
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;

    use sea_orm::{DatabaseBackend, MockDatabase};

    fn meeting_model(status: MeetingStatus) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            title: "Q3 Planning".to_string(),
            description: None,
            status,
            status_reason: None,
            language_code: "yue".to_string(),
            recorded_at: None,
            audio_path: None,
            audio_duration_seconds: None,
            tags: None,
            template: None,
            hubspot_synced: false,
            workspace_id: Some(Id::new_v4()),
            owner_id: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn create_returns_a_new_meeting_model() -> Result<(), Error> {
        let meeting_model = meeting_model(MeetingStatus::Uploaded);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![meeting_model.clone()]])
            .into_connection();

        let meeting = create(&db, meeting_model.clone()).await?;

        assert_eq!(meeting.id, meeting_model.id);
        assert_eq!(meeting.status, MeetingStatus::Uploaded);

        Ok(())
    }

    #[tokio::test]
    async fn update_status_rejects_an_invalid_transition() {
        let completed = meeting_model(MeetingStatus::Completed);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![completed.clone()]])
            .into_connection();

        let result =
            update_status(&db, completed.id, MeetingStatus::Transcribing, None).await;

        match result {
            Err(err) => assert_eq!(err.error_kind, EntityApiErrorKind::ValidationError),
            Ok(_) => panic!("a completed meeting must not re-enter transcription"),
        }
    }

    #[tokio::test]
    async fn update_status_applies_a_valid_transition() -> Result<(), Error> {
        let transcribing = meeting_model(MeetingStatus::Transcribing);
        let mut summarizing = transcribing.clone();
        summarizing.status = MeetingStatus::Summarizing;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![transcribing.clone()], vec![summarizing.clone()]])
            .into_connection();

        let meeting =
            update_status(&db, transcribing.id, MeetingStatus::Summarizing, None).await?;

        assert_eq!(meeting.status, MeetingStatus::Summarizing);

        Ok(())
    }
}
