//! CRUD operations for the action_items table.

use super::error::Error;
use entity::action_items::{ActiveModel, Column, Entity, Model};
use entity::action_priority::ActionPriority;
use entity::action_status::ActionStatus;
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ActiveValue::Set, DatabaseConnection, Order, QueryOrder};

/// A new action item to insert; identity, status bookkeeping and timestamps
/// are assigned here.
#[derive(Debug, Clone)]
pub struct NewActionItem {
    pub title: String,
    pub description: Option<String>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub due_date: Option<Date>,
    pub priority: ActionPriority,
}

/// Replaces all action items for a meeting with the given set. Summarization
/// is idempotent by replacement, never additive.
pub async fn replace_for_meeting(
    db: &DatabaseConnection,
    meeting_id: Id,
    items: Vec<NewActionItem>,
) -> Result<usize, Error> {
    let deleted = Entity::delete_many()
        .filter(Column::MeetingId.eq(meeting_id))
        .exec(db)
        .await?;
    debug!(
        "Replacing {} action items for meeting {meeting_id} with {}",
        deleted.rows_affected,
        items.len()
    );

    let now = chrono::Utc::now();
    let count = items.len();

    for item in items {
        let active_model = ActiveModel {
            id: Set(Id::new_v4()),
            meeting_id: Set(meeting_id),
            title: Set(item.title),
            description: Set(item.description),
            owner_name: Set(item.owner_name),
            owner_email: Set(item.owner_email),
            due_date: Set(item.due_date),
            priority: Set(item.priority),
            status: Set(ActionStatus::Pending),
            completed_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        active_model.insert(db).await?;
    }

    Ok(count)
}

/// Lists a meeting's action items in insertion order.
pub async fn find_by_meeting_id(
    db: &DatabaseConnection,
    meeting_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::MeetingId.eq(meeting_id))
        .order_by(Column::CreatedAt, Order::Asc)
        .all(db)
        .await?)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn stored_item(meeting_id: Id, title: &str) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            meeting_id,
            title: title.to_string(),
            description: Some(title.to_string()),
            owner_name: Some("TBD".to_string()),
            owner_email: None,
            due_date: None,
            priority: ActionPriority::Medium,
            status: ActionStatus::Pending,
            completed_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn replace_for_meeting_swaps_the_full_set() -> Result<(), Error> {
        let meeting_id = Id::new_v4();

        // Three pre-existing rows go, the two new ones come back.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            }])
            .append_query_results(vec![
                vec![stored_item(meeting_id, "Send the deck")],
                vec![stored_item(meeting_id, "Book the room")],
            ])
            .into_connection();

        let created = replace_for_meeting(
            &db,
            meeting_id,
            vec![
                NewActionItem {
                    title: "Send the deck".to_string(),
                    description: Some("Send the deck".to_string()),
                    owner_name: Some("May".to_string()),
                    owner_email: None,
                    due_date: None,
                    priority: ActionPriority::High,
                },
                NewActionItem {
                    title: "Book the room".to_string(),
                    description: Some("Book the room".to_string()),
                    owner_name: Some("TBD".to_string()),
                    owner_email: None,
                    due_date: None,
                    priority: ActionPriority::Medium,
                },
            ],
        )
        .await?;

        assert_eq!(created, 2);

        Ok(())
    }

    #[tokio::test]
    async fn replace_for_meeting_with_no_items_only_deletes() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            }])
            .into_connection();

        let created = replace_for_meeting(&db, Id::new_v4(), Vec::new()).await?;

        assert_eq!(created, 0);

        Ok(())
    }
}
