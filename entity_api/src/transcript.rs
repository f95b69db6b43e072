//! CRUD operations for the transcripts table.

use super::error::Error;
use entity::transcripts::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, TryIntoModel,
};

/// Content of a transcript write; everything except the row identity.
#[derive(Debug, Clone)]
pub struct TranscriptPayload {
    pub language_code: String,
    pub content: String,
    pub segments: Option<Json>,
    pub duration_seconds: Option<i32>,
    pub raw_response: Option<Json>,
}

/// Creates or overwrites the transcript for a meeting. Keyed by meeting id
/// so re-running transcription is idempotent.
pub async fn upsert_by_meeting_id(
    db: &DatabaseConnection,
    meeting_id: Id,
    payload: TranscriptPayload,
) -> Result<Model, Error> {
    let now = chrono::Utc::now();

    match find_by_meeting_id(db, meeting_id).await? {
        Some(existing) => {
            debug!("Overwriting transcript for meeting: {meeting_id}");

            let active_model = ActiveModel {
                id: Unchanged(existing.id),
                meeting_id: Unchanged(existing.meeting_id),
                language_code: Set(payload.language_code),
                duration_seconds: Set(payload.duration_seconds),
                content: Set(payload.content),
                segments: Set(payload.segments),
                raw_response: Set(payload.raw_response),
                created_at: Unchanged(existing.created_at),
                updated_at: Set(now.into()),
            };

            Ok(active_model.update(db).await?.try_into_model()?)
        }
        None => {
            debug!("Creating transcript for meeting: {meeting_id}");

            let active_model = ActiveModel {
                id: Set(Id::new_v4()),
                meeting_id: Set(meeting_id),
                language_code: Set(payload.language_code),
                duration_seconds: Set(payload.duration_seconds),
                content: Set(payload.content),
                segments: Set(payload.segments),
                raw_response: Set(payload.raw_response),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            };

            Ok(active_model.insert(db).await?.try_into_model()?)
        }
    }
}

/// Finds the transcript for a meeting, if one exists.
pub async fn find_by_meeting_id(
    db: &DatabaseConnection,
    meeting_id: Id,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::MeetingId.eq(meeting_id))
        .one(db)
        .await?)
}
