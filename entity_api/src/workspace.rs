//! Read operations for the workspaces table. Workspace provisioning and
//! membership management live outside this service; rows here are only ever
//! looked up to scope queries.

use super::error::{EntityApiErrorKind, Error};
use entity::workspaces::{Entity, Model};
use entity::Id;
use sea_orm::{entity::prelude::*, DatabaseConnection};

/// Finds a workspace by ID
pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}
