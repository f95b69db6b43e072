use crate::controller::health_check_controller;
use crate::controller::{meeting_controller, task_controller};
use crate::{params, response, AppState};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

/// Largest accepted upload body; long recordings are big.
const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Meeting Notes Platform API"
        ),
        paths(
            health_check_controller::health_check,
            meeting_controller::upload,
            meeting_controller::index,
            meeting_controller::read,
            meeting_controller::update,
            meeting_controller::delete,
            task_controller::index,
            task_controller::read,
            task_controller::finalize,
        ),
        components(
            schemas(
                meeting_controller::MeetingUploadResponse,
                response::meeting::MeetingListItemResponse,
                response::meeting::MeetingDetailResponse,
                response::meeting::MeetingSummaryResponse,
                response::meeting::TranscriptSegmentResponse,
                response::meeting::SpeakerResponse,
                response::meeting::ActionItemResponse,
                response::meeting::KeyDecisionResponse,
                response::task::ProcessingTaskListResponse,
                response::task::ProcessingTaskDetailResponse,
                task_controller::FinalizeTaskResponse,
                params::meeting::UpdateParams,
                params::meeting::SummaryUpdateParams,
                params::task::FinalizeParams,
            )
        ),
        tags(
            (name = "meeting_notes", description = "Meeting transcription & summarization API")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state);

    Router::new()
        .merge(health_routes())
        .merge(meeting_routes(app_state.clone()))
        .merge(task_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
        .fallback_service(static_routes())
        .layer(cors)
}

fn cors_layer(app_state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = app_state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn meeting_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/meetings/upload", post(meeting_controller::upload))
        .route("/meetings", get(meeting_controller::index))
        .route("/meetings/:id", get(meeting_controller::read))
        .route("/meetings/:id", patch(meeting_controller::update))
        .route("/meetings/:id", delete(meeting_controller::delete))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(app_state)
}

fn task_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/tasks", get(task_controller::index))
        .route("/tasks/:id", get(task_controller::read))
        .route("/tasks/:id/finalize", post(task_controller::finalize))
        .with_state(app_state)
}

// This will serve static files that we can use as a "fallback" for when the server panics
pub fn static_routes() -> Router {
    Router::new().nest_service("/", ServeDir::new("./"))
}
