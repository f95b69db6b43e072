use domain::meeting_status::MeetingStatus;
use domain::Id;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Query parameters for listing a workspace's meetings.
#[derive(Debug, Deserialize, IntoParams)]
pub(crate) struct IndexParams {
    pub(crate) workspace_id: Id,
    /// Optional status filter
    #[param(value_type = Option<String>)]
    #[serde(default)]
    pub(crate) status: Option<MeetingStatus>,
    /// Sort field: created_at (default), recorded_at, title
    #[serde(default)]
    pub(crate) sort_by: Option<String>,
    /// Sort order: asc or desc (default)
    #[serde(default)]
    pub(crate) order: Option<String>,
    /// 1-based page number
    #[serde(default)]
    pub(crate) page: Option<u64>,
    #[serde(default)]
    pub(crate) page_size: Option<u64>,
}

/// Direct summary field edits accepted by the update endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct SummaryUpdateParams {
    #[serde(default)]
    pub(crate) overview: Option<String>,
    #[serde(default)]
    pub(crate) detailed_minutes: Option<String>,
    #[schema(value_type = Option<Object>)]
    #[serde(default)]
    pub(crate) decisions: Option<serde_json::Value>,
    #[schema(value_type = Option<Object>)]
    #[serde(default)]
    pub(crate) highlights: Option<serde_json::Value>,
}

/// Body of PATCH /meetings/{id}.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct UpdateParams {
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) tags: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) template: Option<String>,
    #[serde(default)]
    pub(crate) summary_update: Option<SummaryUpdateParams>,
}
