//! Controller for meeting operations: audio upload, listing, detail,
//! updates and deletion.

use crate::controller::ApiResponse;
use crate::params::meeting::{IndexParams, UpdateParams};
use crate::response::meeting::{MeetingDetailResponse, MeetingListItemResponse};
use crate::{AppState, Error};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use domain::meeting as MeetingApi;
use domain::meeting::{ListParams, MeetingSortField, MeetingUpdate, UploadRequest};
use domain::meeting_status::MeetingStatus;
use domain::Id;
use log::*;
use serde::Serialize;
use utoipa::ToSchema;

/// Response for a successful upload.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct MeetingUploadResponse {
    pub meeting_id: Id,
    pub task_id: Id,
    pub message: String,
    /// Meeting status at upload time (always "uploaded")
    #[schema(value_type = String)]
    pub status: MeetingStatus,
}

/// POST /meetings/upload
///
/// Accepts a multipart audio upload, creates the Meeting and its
/// ProcessingTask, and enqueues the transcription stage.
#[utoipa::path(
    post,
    path = "/meetings/upload",
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "file plus workspace_id, and optional title/template/tags/description/language_code fields"),
    responses(
        (status = 201, description = "Upload accepted and transcription queued", body = MeetingUploadResponse),
        (status = 422, description = "Unsupported file type or missing fields"),
        (status = 500, description = "Failed to store the file or enqueue the job"),
    )
)]
pub async fn upload(
    State(app_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, Error> {
    let mut filename: Option<String> = None;
    let mut bytes: Vec<u8> = Vec::new();
    let mut workspace_id: Option<Id> = None;
    let mut title: Option<String> = None;
    let mut template: Option<String> = None;
    let mut tags: Option<Vec<String>> = None;
    let mut description: Option<String> = None;
    let mut language_code: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| domain::error::Error::invalid(format!("Malformed upload: {err}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                filename = field.file_name().map(String::from);
                bytes = field
                    .bytes()
                    .await
                    .map_err(|err| {
                        domain::error::Error::invalid(format!("Failed to read file: {err}"))
                    })?
                    .to_vec();
            }
            "workspace_id" | "workspaceId" => {
                let value = read_text_field(field).await?;
                workspace_id = Some(value.parse::<Id>().map_err(|_| {
                    domain::error::Error::invalid("workspace_id is not a valid id")
                })?);
            }
            "title" => title = Some(read_text_field(field).await?),
            "template" => template = Some(read_text_field(field).await?),
            "description" => description = Some(read_text_field(field).await?),
            "language_code" => language_code = Some(read_text_field(field).await?),
            "tags" => {
                // Tags arrive as a JSON array string; anything unparseable
                // is ignored rather than failing the upload.
                let value = read_text_field(field).await?;
                tags = serde_json::from_str::<Vec<String>>(&value).ok();
            }
            _ => {}
        }
    }

    let filename = filename
        .filter(|name| !name.is_empty())
        .ok_or_else(|| domain::error::Error::invalid("Filename is required"))?;
    let workspace_id = workspace_id
        .ok_or_else(|| domain::error::Error::invalid("workspace_id is required"))?;

    info!("Uploading meeting audio: {filename} ({} bytes)", bytes.len());

    let outcome = MeetingApi::upload(
        app_state.db_conn_ref(),
        &app_state.config,
        UploadRequest {
            workspace_id,
            owner_id: None,
            filename,
            bytes,
            title,
            description,
            template,
            tags,
            language_code,
        },
    )
    .await?;

    let response = MeetingUploadResponse {
        meeting_id: outcome.meeting.id,
        task_id: outcome.task.id,
        message: format!(
            "Meeting audio uploaded successfully. Transcription job queued (task_id: {}, job_id: {})",
            outcome.task.id, outcome.job_id
        ),
        status: outcome.meeting.status,
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), response)),
    ))
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, Error> {
    Ok(field
        .text()
        .await
        .map_err(|err| domain::error::Error::invalid(format!("Malformed field: {err}")))?)
}

/// GET /meetings
///
/// List a workspace's meetings with optional status filter, sorting and
/// pagination.
#[utoipa::path(
    get,
    path = "/meetings",
    params(IndexParams),
    responses(
        (status = 200, description = "Meetings retrieved", body = [MeetingListItemResponse]),
        (status = 422, description = "Invalid query parameters"),
    )
)]
pub async fn index(
    State(app_state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET meetings for workspace: {}", params.workspace_id);

    let sort_by = params
        .sort_by
        .as_deref()
        .map(str::parse::<MeetingSortField>)
        .transpose()?
        .unwrap_or_default();
    let descending = !matches!(params.order.as_deref(), Some("asc"));

    let meetings = MeetingApi::list(
        app_state.db_conn_ref(),
        ListParams {
            workspace_id: params.workspace_id,
            status: params.status,
            sort_by,
            descending,
            page: params.page.unwrap_or(1),
            page_size: params.page_size.unwrap_or(20).min(100),
        },
    )
    .await?;

    let items: Vec<MeetingListItemResponse> = meetings
        .iter()
        .map(MeetingListItemResponse::from_model)
        .collect();

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), items)))
}

/// GET /meetings/{id}
///
/// Meeting detail with transcript segments, participants, summary and
/// action items.
#[utoipa::path(
    get,
    path = "/meetings/{id}",
    params(
        ("id" = Id, Path, description = "Meeting ID"),
    ),
    responses(
        (status = 200, description = "Meeting retrieved", body = MeetingDetailResponse),
        (status = 404, description = "Meeting not found"),
    )
)]
pub async fn read(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET meeting: {id}");

    let detail = MeetingApi::find_detail(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        MeetingDetailResponse::from_detail(&detail),
    )))
}

/// PATCH /meetings/{id}
///
/// Update meeting fields and, optionally, edit the AI-generated summary.
#[utoipa::path(
    patch,
    path = "/meetings/{id}",
    params(
        ("id" = Id, Path, description = "Meeting ID"),
    ),
    request_body = UpdateParams,
    responses(
        (status = 200, description = "Meeting updated", body = MeetingDetailResponse),
        (status = 404, description = "Meeting not found"),
    )
)]
pub async fn update(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<UpdateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PATCH meeting: {id}");

    let summary = params.summary_update.map(|update| {
        domain::meeting::SummaryPatch {
            overview: update.overview,
            detailed_minutes: update.detailed_minutes,
            decisions: update.decisions,
            highlights: update.highlights,
        }
    });

    let detail = MeetingApi::update(
        app_state.db_conn_ref(),
        id,
        MeetingUpdate {
            title: params.title,
            description: params.description,
            tags: params.tags,
            template: params.template,
            summary,
        },
    )
    .await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        MeetingDetailResponse::from_detail(&detail),
    )))
}

/// DELETE /meetings/{id}
///
/// Delete a meeting and everything derived from it. Audio blob removal is
/// best-effort.
#[utoipa::path(
    delete,
    path = "/meetings/{id}",
    params(
        ("id" = Id, Path, description = "Meeting ID"),
    ),
    responses(
        (status = 204, description = "Meeting deleted"),
        (status = 404, description = "Meeting not found"),
    )
)]
pub async fn delete(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    info!("DELETE meeting: {id}");

    MeetingApi::delete(app_state.db_conn_ref(), &app_state.config, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
