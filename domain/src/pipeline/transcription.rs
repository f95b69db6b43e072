//! Transcription stage: audio in, normalized transcript persisted, meeting
//! handed to the summarization stage.

use super::{chain_successor, log_task, resolve_task, set_task_progress, Stage, StageContext};
use crate::error::Error;
use crate::gateway::speechmatics::SpeechmaticsClient;
use crate::gateway::whisper::WhisperClient;
use crate::storage::LocalStorage;
use entity::meeting_status::MeetingStatus;
use entity::task_status::TaskStatus;
use entity_api::transcript::TranscriptPayload;
use entity_api::{meeting, processing_task, transcript};
use log::*;
use meeting_ai::normalize::normalize;
use meeting_ai::traits::transcription::Provider;
use meeting_ai::types::transcript::TranscribeRequest;
use service::config::AsrProvider;

pub(super) async fn run(ctx: &StageContext<'_>) -> Result<(), Error> {
    let task = resolve_task(ctx).await;
    let ctx = &StageContext {
        db: ctx.db,
        config: ctx.config,
        meeting_id: ctx.meeting_id,
        task_id: task.as_ref().map(|task| task.id),
    };

    if let Some(task) = &task {
        processing_task::begin_stage(ctx.db, task.id, 5).await?;
        log_task(ctx, "Starting transcription...").await;
    }

    let meeting = meeting::find_by_id(ctx.db, ctx.meeting_id).await?;
    meeting::update_status(ctx.db, meeting.id, MeetingStatus::Transcribing, None).await?;

    let audio_path = meeting
        .audio_path
        .clone()
        .ok_or_else(|| Error::invalid(format!("Meeting {} has no audio file", meeting.id)))?;

    let storage = LocalStorage::new(ctx.config.storage_dir());
    let local_path = storage.resolve(&audio_path).ok_or_else(|| {
        Error::invalid(format!("Audio file not found: {audio_path}"))
    })?;

    let audio = tokio::fs::read(&local_path).await?;
    let filename = local_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    let file_size_mb = audio.len() as f64 / (1024.0 * 1024.0);
    log_task(ctx, &format!("Audio file: {filename} ({file_size_mb:.2} MB)")).await;

    set_task_progress(ctx, 10).await;
    log_task(ctx, "Initializing transcription service...").await;

    let (provider, request): (Box<dyn Provider>, TranscribeRequest) = match ctx.config.asr_provider
    {
        AsrProvider::Speechmatics => {
            let client = SpeechmaticsClient::new(
                ctx.config.speechmatics_api_key(),
                ctx.config.speechmatics_base_url(),
            )?;
            set_task_progress(ctx, 15).await;
            log_task(
                ctx,
                &format!(
                    "Transcribing with Speechmatics (language: {})...",
                    meeting.language_code
                ),
            )
            .await;
            let request = TranscribeRequest {
                audio,
                filename: filename.clone(),
                language: Some(meeting.language_code.clone()),
            };
            (Box::new(client), request)
        }
        AsrProvider::Whisper => {
            let client = WhisperClient::new(
                ctx.config.openai_api_key(),
                ctx.config.openai_base_url(),
            )?;
            set_task_progress(ctx, 20).await;
            log_task(
                ctx,
                &format!(
                    "Transcribing with Whisper API (language: {})...",
                    if meeting.language_code == "yue" {
                        "auto-detect"
                    } else {
                        &meeting.language_code
                    }
                ),
            )
            .await;
            // Whisper handles mixed Cantonese-English audio better when the
            // language is left unset for yue.
            let language = if meeting.language_code == "yue" {
                None
            } else {
                Some(meeting.language_code.clone())
            };
            let request = TranscribeRequest {
                audio,
                filename: filename.clone(),
                language,
            };
            (Box::new(client), request)
        }
    };

    info!(
        "Transcribing meeting {} with provider {}",
        meeting.id,
        provider.provider_id()
    );

    let raw = provider.transcribe(request).await?;

    set_task_progress(ctx, 90).await;
    log_task(ctx, "Transcription completed. Processing results...").await;

    let normalized = normalize(&raw);

    transcript::upsert_by_meeting_id(
        ctx.db,
        meeting.id,
        TranscriptPayload {
            language_code: meeting.language_code.clone(),
            content: normalized.content.clone(),
            segments: Some(serde_json::json!(normalized.segments)),
            duration_seconds: normalized.duration_seconds.map(|seconds| seconds as i32),
            raw_response: Some(normalized.raw_response.clone()),
        },
    )
    .await?;

    // Transcript persisted; the meeting is now waiting on its summary.
    meeting::update_status(ctx.db, meeting.id, MeetingStatus::Summarizing, None).await?;

    if let Some(task) = &task {
        processing_task::update_status(ctx.db, task.id, TaskStatus::ReviewReady, None).await?;
        processing_task::set_progress(ctx.db, task.id, 100).await?;
        let duration_mins = normalized.duration_seconds.unwrap_or(0) as f64 / 60.0;
        log_task(
            ctx,
            &format!(
                "Transcription completed successfully. Transcript: {} chars, Duration: {duration_mins:.1} mins",
                normalized.content.len()
            ),
        )
        .await;
    }

    info!(
        "Transcription completed for meeting {}. Transcript length: {} chars",
        meeting.id,
        normalized.content.len()
    );

    // Transcription success is what triggers summarization; the API never
    // enqueues it directly.
    chain_successor(Stage::Transcription, ctx).await;

    Ok(())
}
