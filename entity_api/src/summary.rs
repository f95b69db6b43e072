//! CRUD operations for the summaries table.

use super::error::Error;
use entity::summaries::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, TryIntoModel,
};

/// Content of a summary write; everything except the row identity.
#[derive(Debug, Clone, Default)]
pub struct SummaryPayload {
    pub overview: Option<String>,
    pub detailed_minutes: Option<String>,
    pub agenda_items: Option<Json>,
    pub decisions: Option<Json>,
    pub highlights: Option<Json>,
    pub generated_by_model: Option<String>,
}

/// Per-field patch applied by the meeting update endpoint; None leaves the
/// stored value alone.
#[derive(Debug, Clone, Default)]
pub struct SummaryPatch {
    pub overview: Option<String>,
    pub detailed_minutes: Option<String>,
    pub decisions: Option<Json>,
    pub highlights: Option<Json>,
}

/// Creates or overwrites the summary for a meeting. Keyed by meeting id so
/// re-running summarization is idempotent.
pub async fn upsert_by_meeting_id(
    db: &DatabaseConnection,
    meeting_id: Id,
    payload: SummaryPayload,
) -> Result<Model, Error> {
    let now = chrono::Utc::now();

    match find_by_meeting_id(db, meeting_id).await? {
        Some(existing) => {
            debug!("Overwriting summary for meeting: {meeting_id}");

            let active_model = ActiveModel {
                id: Unchanged(existing.id),
                meeting_id: Unchanged(existing.meeting_id),
                overview: Set(payload.overview),
                detailed_minutes: Set(payload.detailed_minutes),
                agenda_items: Set(payload.agenda_items),
                decisions: Set(payload.decisions),
                highlights: Set(payload.highlights),
                generated_by_model: Set(payload.generated_by_model),
                created_at: Unchanged(existing.created_at),
                updated_at: Set(now.into()),
            };

            Ok(active_model.update(db).await?.try_into_model()?)
        }
        None => {
            debug!("Creating summary for meeting: {meeting_id}");

            let active_model = ActiveModel {
                id: Set(Id::new_v4()),
                meeting_id: Set(meeting_id),
                overview: Set(payload.overview),
                detailed_minutes: Set(payload.detailed_minutes),
                agenda_items: Set(payload.agenda_items),
                decisions: Set(payload.decisions),
                highlights: Set(payload.highlights),
                generated_by_model: Set(payload.generated_by_model),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            };

            Ok(active_model.insert(db).await?.try_into_model()?)
        }
    }
}

/// Applies a partial edit to a meeting's summary, creating the row when the
/// user edits before summarization has produced one.
pub async fn patch_by_meeting_id(
    db: &DatabaseConnection,
    meeting_id: Id,
    patch: SummaryPatch,
) -> Result<Model, Error> {
    match find_by_meeting_id(db, meeting_id).await? {
        Some(existing) => {
            let active_model = ActiveModel {
                id: Unchanged(existing.id),
                meeting_id: Unchanged(existing.meeting_id),
                overview: Set(patch.overview.or(existing.overview)),
                detailed_minutes: Set(patch.detailed_minutes.or(existing.detailed_minutes)),
                agenda_items: Unchanged(existing.agenda_items),
                decisions: Set(patch.decisions.or(existing.decisions)),
                highlights: Set(patch.highlights.or(existing.highlights)),
                generated_by_model: Unchanged(existing.generated_by_model),
                created_at: Unchanged(existing.created_at),
                updated_at: Set(chrono::Utc::now().into()),
            };

            Ok(active_model.update(db).await?.try_into_model()?)
        }
        None => {
            upsert_by_meeting_id(
                db,
                meeting_id,
                SummaryPayload {
                    overview: patch.overview,
                    detailed_minutes: patch.detailed_minutes,
                    decisions: patch.decisions,
                    highlights: patch.highlights,
                    ..Default::default()
                },
            )
            .await
        }
    }
}

/// Finds the summary for a meeting, if one exists.
pub async fn find_by_meeting_id(
    db: &DatabaseConnection,
    meeting_id: Id,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::MeetingId.eq(meeting_id))
        .one(db)
        .await?)
}
