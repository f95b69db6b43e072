//! Summarization stage: transcript in, structured summary plus a fully
//! replaced action-item set out.

use super::{log_task, resolve_task, set_task_progress, StageContext};
use crate::error::Error;
use crate::gateway::openai::OpenAiSummarizer;
use entity::action_priority::ActionPriority;
use entity::meeting_status::MeetingStatus;
use entity::task_status::TaskStatus;
use entity_api::action_item::{self, NewActionItem};
use entity_api::summary::SummaryPayload;
use entity_api::{meeting, naive_date_parse_str, processing_task, summary, transcript};
use log::*;
use meeting_ai::traits::summarization::Summarizer;
use meeting_ai::types::summary::{ActionItemDraft, SummaryRequest};

pub(super) async fn run(ctx: &StageContext<'_>) -> Result<(), Error> {
    // A task the user already finalized stays Completed; the stage still
    // runs for the meeting's sake but leaves the closed ledger alone.
    let task = resolve_task(ctx).await.filter(|task| {
        if task.status == TaskStatus::Completed {
            info!(
                "Task {} already finalized; summarizing meeting {} without task bookkeeping",
                task.id, ctx.meeting_id
            );
            false
        } else {
            true
        }
    });
    let ctx = &StageContext {
        db: ctx.db,
        config: ctx.config,
        meeting_id: ctx.meeting_id,
        task_id: task.as_ref().map(|task| task.id),
    };

    if let Some(task) = &task {
        // The only permitted backward progress move: a fresh stage start.
        processing_task::begin_stage(ctx.db, task.id, 0).await?;
        log_task(ctx, "Starting AI summarization...").await;
    }

    let meeting = meeting::find_by_id(ctx.db, ctx.meeting_id).await?;

    let transcript = transcript::find_by_meeting_id(ctx.db, meeting.id)
        .await?
        .ok_or_else(|| {
            Error::invalid(format!("Transcript not found for meeting: {}", meeting.id))
        })?;

    // Hard precondition, not recoverable: summarizing nothing is an error.
    if transcript.content.is_empty() {
        return Err(Error::invalid(format!(
            "Transcript content is empty for meeting: {}",
            meeting.id
        )));
    }

    meeting::update_status(ctx.db, meeting.id, MeetingStatus::Summarizing, None).await?;

    let summarizer = OpenAiSummarizer::new(
        ctx.config.openai_api_key(),
        ctx.config.openai_base_url(),
        ctx.config.summarization_model(),
    )?;

    set_task_progress(ctx, 10).await;
    log_task(
        ctx,
        &format!(
            "Calling LLM ({}) to generate summary from {} chars transcript...",
            summarizer.model_id(),
            transcript.content.len()
        ),
    )
    .await;

    let output = summarizer
        .generate_summary(SummaryRequest {
            transcript_text: transcript.content.clone(),
            meeting_title: Some(meeting.title.clone()),
            template: meeting.template.clone(),
            language: meeting.language_code.clone(),
        })
        .await?;

    set_task_progress(ctx, 60).await;
    log_task(
        ctx,
        &format!(
            "Summary generated (Overview: {} chars, Detailed Minutes: {} chars). Processing results...",
            output.overview.len(),
            output
                .detailed_minutes
                .as_ref()
                .map(|minutes| minutes.len())
                .unwrap_or(0)
        ),
    )
    .await;

    let generated_by_model = summarizer.model_id().to_string();
    summary::upsert_by_meeting_id(
        ctx.db,
        meeting.id,
        SummaryPayload {
            overview: Some(output.overview.clone()),
            detailed_minutes: output.detailed_minutes.clone(),
            agenda_items: Some(serde_json::json!(output.agenda_items)),
            decisions: Some(serde_json::json!(output.decisions)),
            highlights: Some(serde_json::json!(output.highlights)),
            generated_by_model: Some(generated_by_model),
        },
    )
    .await?;

    let drafts = output.action_item_drafts();
    info!(
        "Extracted {} action items from summary for meeting {}",
        drafts.len(),
        meeting.id
    );

    set_task_progress(ctx, 70).await;
    log_task(
        ctx,
        &format!(
            "Extracting action items from summary ({} found)...",
            drafts.len()
        ),
    )
    .await;

    // Full-replace semantics: prior items are gone, only this run's set
    // remains.
    let items: Vec<NewActionItem> = drafts.into_iter().map(draft_to_new_item).collect();
    let created_count = action_item::replace_for_meeting(ctx.db, meeting.id, items).await?;

    set_task_progress(ctx, 90).await;
    log_task(
        ctx,
        &format!("Created {created_count} action items. Finalizing..."),
    )
    .await;

    meeting::update_status(ctx.db, meeting.id, MeetingStatus::Completed, None).await?;

    // ReviewReady, not Completed: the user confirms via the finalize
    // endpoint before the record counts as final.
    if let Some(task) = &task {
        processing_task::update_status(ctx.db, task.id, TaskStatus::ReviewReady, None).await?;
        processing_task::set_progress(ctx.db, task.id, 100).await?;
        log_task(
            ctx,
            &format!(
                "AI summarization completed successfully. Overview: {} chars, {created_count} action items.",
                output.overview.len()
            ),
        )
        .await;
        log_task(
            ctx,
            "Ready for review. You can now configure meeting details and finalize.",
        )
        .await;
    }

    info!(
        "Summary generation completed for meeting {}. Overview: {} chars, Action items: {created_count}",
        meeting.id,
        output.overview.len()
    );

    Ok(())
}

/// Maps a vendor draft onto an insertable action item, parsing the loose
/// fields leniently: unknown priorities become Medium, unparseable due
/// dates become None, a missing owner becomes "TBD".
fn draft_to_new_item(draft: ActionItemDraft) -> NewActionItem {
    let title: String = draft.description.chars().take(255).collect();
    let due_date = draft.due_date.as_deref().and_then(parse_due_date);
    let priority = draft
        .priority
        .as_deref()
        .map(ActionPriority::parse_lenient)
        .unwrap_or_default();

    NewActionItem {
        title,
        description: Some(draft.description),
        owner_name: Some(draft.owner.unwrap_or_else(|| "TBD".to_string())),
        owner_email: None,
        due_date,
        priority,
    }
}

/// Accepts `YYYY-MM-DD` or an ISO datetime (with or without a trailing Z).
fn parse_due_date(value: &str) -> Option<chrono::NaiveDate> {
    if value.contains('T') || value.contains('Z') {
        let normalized = value.replace('Z', "+00:00");
        match chrono::DateTime::parse_from_rfc3339(&normalized) {
            Ok(datetime) => return Some(datetime.date_naive()),
            Err(err) => {
                warn!("Could not parse due date '{value}': {err}");
                return None;
            }
        }
    }

    match naive_date_parse_str(value) {
        Ok(date) => Some(date),
        Err(_) => {
            warn!("Could not parse due date '{value}'");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(description: &str) -> ActionItemDraft {
        ActionItemDraft {
            description: description.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn plain_dates_and_iso_datetimes_both_parse() {
        assert_eq!(
            parse_due_date("2025-09-01").unwrap().to_string(),
            "2025-09-01"
        );
        assert_eq!(
            parse_due_date("2025-09-01T10:30:00Z").unwrap().to_string(),
            "2025-09-01"
        );
        assert_eq!(
            parse_due_date("2025-09-01T10:30:00+08:00")
                .unwrap()
                .to_string(),
            "2025-09-01"
        );
    }

    #[test]
    fn unparseable_due_dates_become_none_not_errors() {
        assert!(parse_due_date("next friday").is_none());
        assert!(parse_due_date("2025-13-45").is_none());
        assert!(parse_due_date("").is_none());
    }

    #[test]
    fn missing_owner_defaults_to_tbd_and_priority_to_medium() {
        let item = draft_to_new_item(draft("Send the slides"));
        assert_eq!(item.owner_name.as_deref(), Some("TBD"));
        assert_eq!(item.priority, ActionPriority::Medium);
        assert!(item.due_date.is_none());
    }

    #[test]
    fn long_descriptions_are_truncated_into_the_title() {
        let long = "很".repeat(400);
        let item = draft_to_new_item(draft(&long));
        assert_eq!(item.title.chars().count(), 255);
        assert_eq!(item.description.as_deref().map(|d| d.chars().count()), Some(400));
    }

    #[test]
    fn populated_drafts_map_field_for_field() {
        let mut d = draft("Book the demo room");
        d.owner = Some("Priya".to_string());
        d.priority = Some("HIGH".to_string());
        d.due_date = Some("2025-10-02".to_string());

        let item = draft_to_new_item(d);
        assert_eq!(item.title, "Book the demo room");
        assert_eq!(item.owner_name.as_deref(), Some("Priya"));
        assert_eq!(item.priority, ActionPriority::High);
        assert_eq!(item.due_date.unwrap().to_string(), "2025-10-02");
    }
}
