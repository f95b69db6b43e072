//! Controller for processing task operations: listing, detail and the
//! finalize endpoint that closes out a reviewed task.

use crate::controller::ApiResponse;
use crate::params::task::{FinalizeParams, IndexParams};
use crate::response::task::{ProcessingTaskDetailResponse, ProcessingTaskListResponse};
use crate::{AppState, Error};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use domain::processing_task as ProcessingTaskApi;
use domain::processing_task::FinalizeRequest;
use domain::Id;
use log::*;
use serde::Serialize;
use utoipa::ToSchema;

/// Response of the finalize endpoint: the meeting id the task produced.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct FinalizeTaskResponse {
    pub id: Id,
}

/// GET /tasks
///
/// List a workspace's processing tasks, newest first.
#[utoipa::path(
    get,
    path = "/tasks",
    params(IndexParams),
    responses(
        (status = 200, description = "Tasks retrieved", body = [ProcessingTaskListResponse]),
    )
)]
pub async fn index(
    State(app_state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET tasks for workspace: {}", params.workspace_id);

    let tasks =
        ProcessingTaskApi::list_by_workspace(app_state.db_conn_ref(), params.workspace_id).await?;

    let items: Vec<ProcessingTaskListResponse> = tasks
        .iter()
        .map(ProcessingTaskListResponse::from_model)
        .collect();

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), items)))
}

/// GET /tasks/{id}
///
/// Detailed task projection including the meeting link, queue reference and
/// error message.
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    params(
        ("id" = Id, Path, description = "Processing task ID"),
    ),
    responses(
        (status = 200, description = "Task retrieved", body = ProcessingTaskDetailResponse),
        (status = 404, description = "Task not found"),
    )
)]
pub async fn read(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET task: {id}");

    let task = ProcessingTaskApi::find_by_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        ProcessingTaskDetailResponse::from_model(&task),
    )))
}

/// POST /tasks/{id}/finalize
///
/// Close out a reviewed task: overwrite the meeting's user-facing fields
/// and mark the task completed. Idempotent; rejections report the observed
/// task status and progress.
#[utoipa::path(
    post,
    path = "/tasks/{id}/finalize",
    params(
        ("id" = Id, Path, description = "Processing task ID"),
    ),
    request_body = FinalizeParams,
    responses(
        (status = 200, description = "Task finalized", body = FinalizeTaskResponse),
        (status = 404, description = "Task not found"),
        (status = 422, description = "Task is not in a finalizable state"),
    )
)]
pub async fn finalize(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<FinalizeParams>,
) -> Result<impl IntoResponse, Error> {
    info!("POST finalize task: {id}");

    let meeting = ProcessingTaskApi::finalize(
        app_state.db_conn_ref(),
        id,
        FinalizeRequest {
            title: params.title,
            template: params.template,
            tags: params.tags,
        },
    )
    .await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        FinalizeTaskResponse { id: meeting.id },
    )))
}
