use domain::Id;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Query parameters for listing a workspace's processing tasks.
#[derive(Debug, Deserialize, IntoParams)]
pub(crate) struct IndexParams {
    pub(crate) workspace_id: Id,
}

/// Body of POST /tasks/{id}/finalize.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct FinalizeParams {
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) template: Option<String>,
    #[serde(default)]
    pub(crate) tags: Vec<String>,
}
